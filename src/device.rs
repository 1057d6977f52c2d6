//! Output device and auxiliary effect slots.

use super::MAX_CHANNELS;

/// Output channel indices within one dry-buffer frame.
pub const FRONT_LEFT: usize = 0;
pub const FRONT_RIGHT: usize = 1;
pub const FRONT_CENTER: usize = 2;
pub const LFE: usize = 3;
pub const BACK_LEFT: usize = 4;
pub const BACK_RIGHT: usize = 5;
pub const SIDE_LEFT: usize = 6;
pub const SIDE_RIGHT: usize = 7;

/// Effect loaded into an auxiliary slot. The slot processors themselves live
/// outside the mixing core; the mixer only needs to know whether a slot is
/// bypassed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EffectType {
    /// Bypass: sends targeting this slot are skipped.
    #[default]
    Null,
    Reverb,
    Chorus,
    Echo,
}

/// Auxiliary effect slot: a mono wet accumulator with its own click state.
#[derive(Clone, Debug)]
pub struct EffectSlot {
    pub effect: EffectType,
    /// Mono wet accumulator, one value per output sample.
    pub wet_buffer: Vec<f32>,
    pub click_removal: [f32; 1],
    pub pending_clicks: [f32; 1],
}

impl EffectSlot {
    /// Create a bypassed slot able to hold `max_block` output samples.
    pub fn new(max_block: usize) -> Self {
        Self {
            effect: EffectType::Null,
            wet_buffer: vec![0.0; max_block],
            click_removal: [0.0],
            pending_clicks: [0.0],
        }
    }
}

/// Output device state the mixing core accumulates into.
///
/// `dry_buffer` holds one interleaved frame of `MAX_CHANNELS` accumulators
/// per output sample. `click_removal` and `pending_clicks` carry the
/// block-boundary corrections: the device mix stage promotes pending clicks
/// to click removal between blocks and fades the correction out over the
/// next block, so consecutive blocks connect without discontinuities.
#[derive(Clone, Debug)]
pub struct Device {
    pub dry_buffer: Vec<[f32; MAX_CHANNELS]>,
    pub click_removal: [f32; MAX_CHANNELS],
    pub pending_clicks: [f32; MAX_CHANNELS],
    pub num_aux_sends: usize,
    pub effect_slots: Vec<EffectSlot>,
}

impl Device {
    /// Create a device able to mix `max_block` output samples per call, with
    /// `num_aux_sends` auxiliary sends, each backed by a bypassed slot.
    pub fn new(max_block: usize, num_aux_sends: usize) -> Self {
        Self {
            dry_buffer: vec![[0.0; MAX_CHANNELS]; max_block],
            click_removal: [0.0; MAX_CHANNELS],
            pending_clicks: [0.0; MAX_CHANNELS],
            num_aux_sends,
            effect_slots: (0..num_aux_sends).map(|_| EffectSlot::new(max_block)).collect(),
        }
    }
}
