//! Per-source mixing core for a 3D spatial audio engine.
//!
//! A playing [`Source`](source::Source) owns a queue of PCM buffers and a set
//! of resolved mixing parameters. [`mix_source`](feed::mix_source) produces
//! the next block of output samples from it: the feed loop assembles a
//! contiguous, padded window of source data spanning queue items and loop
//! points, then a mixer selected once per parameter update resamples it, runs
//! the voice low-pass filter, and accumulates into the device dry buffer (or
//! the binaural front pair when HRTF rendering is active) and into any
//! auxiliary effect-slot wet buffers. All accumulation is additive; draining
//! and zeroing the accumulators belongs to the enclosing device mix stage.

#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]

/// Number of bits in the fractional part of a resampling position.
pub const FRACTION_BITS: u32 = 14;
/// One whole sample step in fixed-point phase units.
pub const FRACTION_ONE: u32 = 1 << FRACTION_BITS;
/// Mask extracting the fractional phase from a fixed-point position.
pub const FRACTION_MASK: u32 = FRACTION_ONE - 1;

/// Maximum number of device output channels.
pub const MAX_CHANNELS: usize = 8;
/// Maximum number of auxiliary sends per source.
pub const MAX_SENDS: usize = 4;

/// Capacity in bytes of the stack-resident source window.
pub const STACK_DATA_SIZE: usize = 16384;

pub const HRIR_BITS: usize = 5;
/// Length of one head-related impulse response, in samples. Power of two.
pub const HRIR_LENGTH: usize = 1 << HRIR_BITS;
pub const HRIR_MASK: usize = HRIR_LENGTH - 1;

pub const SRC_HISTORY_BITS: usize = 6;
/// Length of the pre-convolution history ring, in samples. Power of two.
pub const SRC_HISTORY_LENGTH: usize = 1 << SRC_HISTORY_BITS;
pub const SRC_HISTORY_MASK: usize = SRC_HISTORY_LENGTH - 1;

pub mod device;
pub mod feed;
pub mod filter;
pub mod hrtf;
pub mod math;
pub mod mix;
pub mod prelude;
pub mod resample;
pub mod sample;
pub mod source;
