//! The one-stop import for the mixing core.

pub use super::device::{
    Device, EffectSlot, EffectType, BACK_LEFT, BACK_RIGHT, FRONT_CENTER, FRONT_LEFT, FRONT_RIGHT,
    LFE, SIDE_LEFT, SIDE_RIGHT,
};
pub use super::feed::mix_source;
pub use super::filter::{low_pass_coeff, LowPassFilter, OnePoleFilter};
pub use super::math::{lerp, spline};
pub use super::mix::{select_hrtf_mixer, select_mixer, MixerFn};
pub use super::resample::{Resampler, Window};
pub use super::sample::Sample;
pub use super::source::{
    Buffer, FmtType, HrtfParams, HrtfState, Params, SendParams, Source, SourceState, SourceType,
};
pub use super::{
    FRACTION_BITS, FRACTION_MASK, FRACTION_ONE, HRIR_LENGTH, HRIR_MASK, MAX_CHANNELS, MAX_SENDS,
    SRC_HISTORY_LENGTH, SRC_HISTORY_MASK, STACK_DATA_SIZE,
};
