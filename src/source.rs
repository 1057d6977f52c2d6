//! Sources, buffers and resolved mixing parameters.

use std::sync::Arc;

use super::filter::{LowPassFilter, OnePoleFilter};
use super::mix::{select_hrtf_mixer, select_mixer, MixerFn};
use super::resample::Resampler;
use super::{FRACTION_ONE, HRIR_LENGTH, MAX_CHANNELS, MAX_SENDS, SRC_HISTORY_LENGTH};

/// Storage format of buffer samples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FmtType {
    /// Signed 8-bit, normalized by 1/127.
    Byte,
    /// Signed 16-bit, normalized by 1/32767.
    Short,
    /// 32-bit float, stored normalized.
    #[default]
    Float,
}

impl FmtType {
    /// Size of one stored element in bytes.
    #[inline]
    pub fn sample_size(self) -> usize {
        match self {
            FmtType::Byte => 1,
            FmtType::Short => 2,
            FmtType::Float => 4,
        }
    }
}

/// PCM data shared between sources. Samples are interleaved, native-endian;
/// loop points are in sample frames.
#[derive(Clone, Debug)]
pub struct Buffer {
    pub data: Vec<u8>,
    pub fmt: FmtType,
    pub channels: usize,
    pub loop_start: usize,
    pub loop_end: usize,
}

impl Buffer {
    /// Create a buffer from raw bytes in the given format.
    pub fn new(data: Vec<u8>, fmt: FmtType, channels: usize) -> Self {
        let mut buffer = Self {
            data,
            fmt,
            channels,
            loop_start: 0,
            loop_end: 0,
        };
        buffer.loop_end = buffer.sample_count();
        buffer
    }

    /// Create an 8-bit buffer from interleaved samples.
    pub fn from_i8(samples: &[i8], channels: usize) -> Self {
        let data = samples.iter().map(|&s| s as u8).collect();
        Self::new(data, FmtType::Byte, channels)
    }

    /// Create a 16-bit buffer from interleaved samples.
    pub fn from_i16(samples: &[i16], channels: usize) -> Self {
        let data = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::new(data, FmtType::Short, channels)
    }

    /// Create a float buffer from interleaved samples.
    pub fn from_f32(samples: &[f32], channels: usize) -> Self {
        let data = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::new(data, FmtType::Float, channels)
    }

    /// Set the loop region, in sample frames.
    pub fn with_loop_points(mut self, start: usize, end: usize) -> Self {
        self.loop_start = start;
        self.loop_end = end;
        self
    }

    /// Size of one sample frame in bytes.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.channels * self.fmt.sample_size()
    }

    /// Length of the buffer in sample frames.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.data.len() / self.frame_size()
    }
}

/// Playback state of a source. Only `Playing` sources are mixed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SourceState {
    #[default]
    Initial,
    Playing,
    Paused,
    Stopped,
}

/// Queueing mode of a source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SourceType {
    /// One buffer, with optional loop-region looping.
    Static,
    /// A queue of buffers played back to back.
    #[default]
    Streaming,
}

/// Per-send routing resolved for the current mix slice.
#[derive(Clone, Debug, Default)]
pub struct SendParams {
    /// Index of the target slot among the device's effect slots, or `None`
    /// when the send is disconnected.
    pub slot: Option<usize>,
    pub wet_gain: f32,
    pub iir_filter: OnePoleFilter,
}

/// HRTF targets resolved for the current mix slice. Coefficients ramp
/// linearly toward their targets by `coeff_step` per output sample while the
/// source's ramp counter runs; delays are 16.16 fixed-point per ear and ramp
/// by `delay_step`.
#[derive(Clone, Debug)]
pub struct HrtfParams {
    pub coeffs: [[[f32; 2]; HRIR_LENGTH]; MAX_CHANNELS],
    pub coeff_step: [[f32; 2]; HRIR_LENGTH],
    pub delay: [[u32; 2]; MAX_CHANNELS],
    pub delay_step: [i32; 2],
}

impl Default for HrtfParams {
    fn default() -> Self {
        Self {
            coeffs: [[[0.0; 2]; HRIR_LENGTH]; MAX_CHANNELS],
            coeff_step: [[0.0; 2]; HRIR_LENGTH],
            delay: [[0; 2]; MAX_CHANNELS],
            delay_step: [0; 2],
        }
    }
}

/// Mixing parameters resolved by the parameter-update stage. The core
/// consumes them as-is: gains, filter coefficients and HRTF targets are
/// already derived from listener and source properties.
#[derive(Clone)]
pub struct Params {
    /// Resample phase increment per output sample, fixed-point.
    pub step: u32,
    /// Voice low-pass filter for the dry path.
    pub iir_filter: LowPassFilter,
    /// Panning gain per source channel and output channel (non-HRTF mode).
    pub dry_gains: [[f32; MAX_CHANNELS]; MAX_CHANNELS],
    /// HRTF targets (HRTF mode).
    pub hrtf: HrtfParams,
    /// Mixer selected for the current format, resampler and spatialization.
    pub do_mix: MixerFn,
    /// Auxiliary send routing.
    pub sends: [SendParams; MAX_SENDS],
}

impl Default for Params {
    fn default() -> Self {
        Self {
            step: FRACTION_ONE,
            iir_filter: LowPassFilter::pass_through(),
            dry_gains: [[0.0; MAX_CHANNELS]; MAX_CHANNELS],
            hrtf: HrtfParams::default(),
            do_mix: select_mixer(FmtType::Float, Resampler::Point),
            sends: Default::default(),
        }
    }
}

/// Per-source HRTF rendering state: the parameter-ramp countdown, the rolling
/// ring write index, and the per-channel history and output rings. Ring
/// lengths are powers of two so wrapping is a mask.
#[derive(Clone)]
pub struct HrtfState {
    /// Output samples of parameter interpolation left; 0 once targets are
    /// reached.
    pub counter: usize,
    /// Rolling write index into the rings.
    pub offset: u32,
    /// Whether the previous mix slice found the source playing.
    pub moving: bool,
    /// Delay line of the filtered pre-convolution signal, per channel.
    pub history: [[f32; SRC_HISTORY_LENGTH]; MAX_CHANNELS],
    /// FIR-accumulated left/right contributions, per channel.
    pub values: [[[f32; 2]; HRIR_LENGTH]; MAX_CHANNELS],
}

impl Default for HrtfState {
    fn default() -> Self {
        Self {
            counter: 0,
            offset: 0,
            moving: false,
            history: [[0.0; SRC_HISTORY_LENGTH]; MAX_CHANNELS],
            values: [[[0.0; 2]; HRIR_LENGTH]; MAX_CHANNELS],
        }
    }
}

/// One playing voice: a buffer queue, a playback cursor and the parameters
/// resolved for the current mix slice.
///
/// The mixing core is the only mutator of the playback cursor and state;
/// parameter updates and queue edits must not run concurrently with a mix
/// call on the same source.
#[derive(Clone)]
pub struct Source {
    pub state: SourceState,
    pub source_type: SourceType,
    /// Ordered buffer queue. Entries without a buffer are skipped.
    pub queue: Vec<Option<Arc<Buffer>>>,
    /// Index of the queue entry currently playing.
    pub buffers_played: usize,
    /// Sample frame index within the current entry.
    pub position: usize,
    /// Fractional phase below `position`, in `FRACTION_ONE` units.
    pub position_fraction: u32,
    /// Meaningful for static sources.
    pub looping: bool,
    pub channels: usize,
    pub sample_size: usize,
    pub resampler: Resampler,
    pub params: Params,
    pub hrtf: HrtfState,
}

impl Source {
    /// Create a static source playing `buffer`.
    pub fn new_static(buffer: Arc<Buffer>) -> Self {
        let channels = buffer.channels;
        let sample_size = buffer.fmt.sample_size();
        Self {
            state: SourceState::Initial,
            source_type: SourceType::Static,
            queue: vec![Some(buffer)],
            buffers_played: 0,
            position: 0,
            position_fraction: 0,
            looping: false,
            channels,
            sample_size,
            resampler: Resampler::default(),
            params: Params::default(),
            hrtf: HrtfState::default(),
        }
    }

    /// Create a streaming source with an empty queue. All queued buffers
    /// must share `channels` and `fmt`.
    pub fn new_streaming(channels: usize, fmt: FmtType) -> Self {
        Self {
            state: SourceState::Initial,
            source_type: SourceType::Streaming,
            queue: Vec::new(),
            buffers_played: 0,
            position: 0,
            position_fraction: 0,
            looping: false,
            channels,
            sample_size: fmt.sample_size(),
            resampler: Resampler::default(),
            params: Params::default(),
            hrtf: HrtfState::default(),
        }
    }

    /// Append a buffer to the queue.
    pub fn queue_buffer(&mut self, buffer: Arc<Buffer>) {
        self.queue.push(Some(buffer));
    }

    /// Size of one sample frame in bytes.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.channels * self.sample_size
    }

    /// Format of the queued buffers, from the first non-empty entry.
    pub fn fmt(&self) -> Option<FmtType> {
        self.queue.iter().flatten().next().map(|b| b.fmt)
    }

    /// Re-select the mixer after the buffer format, resampler or
    /// spatialization mode changes.
    pub fn update_mixer(&mut self, hrtf: bool) {
        if let Some(fmt) = self.fmt() {
            self.params.do_mix = if hrtf {
                select_hrtf_mixer(fmt, self.resampler)
            } else {
                select_mixer(fmt, self.resampler)
            };
        }
    }

    /// Start playback from the current cursor.
    pub fn play(&mut self) {
        self.state = SourceState::Playing;
    }
}
