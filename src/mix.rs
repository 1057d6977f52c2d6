//! Dry and wet per-source mixers and the kernel dispatch tables.

use super::device::{Device, EffectType};
use super::hrtf::mix_hrtf;
use super::resample::{Cubic, Kernel, Lerp, Point, Resampler, Window};
use super::sample::Sample;
use super::source::{FmtType, Source};
use super::{FRACTION_BITS, FRACTION_MASK, MAX_CHANNELS, MAX_SENDS};

/// A mixer selected for one combination of sample format, resampling kernel
/// and spatialization mode.
///
/// Arguments: source, device, assembled source window, playback position
/// (in/out), fractional phase (in/out), output write position, output samples
/// in the whole block, and output samples to produce from this window
/// (`buffer_size <= samples_to_do`). The mixer advances the position by
/// exactly `buffer_size` output steps.
pub type MixerFn =
    fn(&mut Source, &mut Device, Window, &mut usize, &mut u32, usize, usize, usize);

/// Select the plain (non-HRTF) mixer for a buffer format and resampler.
/// Selection happens once per source parameter update, never per sample.
pub fn select_mixer(fmt: FmtType, resampler: Resampler) -> MixerFn {
    match (resampler, fmt) {
        (Resampler::Point, FmtType::Byte) => mix_plain::<i8, Point>,
        (Resampler::Point, FmtType::Short) => mix_plain::<i16, Point>,
        (Resampler::Point, FmtType::Float) => mix_plain::<f32, Point>,
        (Resampler::Linear, FmtType::Byte) => mix_plain::<i8, Lerp>,
        (Resampler::Linear, FmtType::Short) => mix_plain::<i16, Lerp>,
        (Resampler::Linear, FmtType::Float) => mix_plain::<f32, Lerp>,
        (Resampler::Cubic, FmtType::Byte) => mix_plain::<i8, Cubic>,
        (Resampler::Cubic, FmtType::Short) => mix_plain::<i16, Cubic>,
        (Resampler::Cubic, FmtType::Float) => mix_plain::<f32, Cubic>,
    }
}

/// Select the HRTF mixer for a buffer format and resampler.
pub fn select_hrtf_mixer(fmt: FmtType, resampler: Resampler) -> MixerFn {
    match (resampler, fmt) {
        (Resampler::Point, FmtType::Byte) => mix_hrtf::<i8, Point>,
        (Resampler::Point, FmtType::Short) => mix_hrtf::<i16, Point>,
        (Resampler::Point, FmtType::Float) => mix_hrtf::<f32, Point>,
        (Resampler::Linear, FmtType::Byte) => mix_hrtf::<i8, Lerp>,
        (Resampler::Linear, FmtType::Short) => mix_hrtf::<i16, Lerp>,
        (Resampler::Linear, FmtType::Float) => mix_hrtf::<f32, Lerp>,
        (Resampler::Cubic, FmtType::Byte) => mix_hrtf::<i8, Cubic>,
        (Resampler::Cubic, FmtType::Short) => mix_hrtf::<i16, Cubic>,
        (Resampler::Cubic, FmtType::Float) => mix_hrtf::<f32, Cubic>,
    }
}

/// Resample, filter and pan one source into the device dry buffer.
///
/// At the first output sample of a block the filter's would-be output is
/// subtracted from the device click-removal accumulator, and at the last it
/// is added to the pending clicks, so the device mix stage can fade the
/// block seam. The resample cursor restarts for every channel; the final
/// position writeback equals `buffer_size` advancement steps from the entry
/// position.
pub(crate) fn mix_plain<S: Sample, K: Kernel>(
    source: &mut Source,
    device: &mut Device,
    window: Window,
    pos_int: &mut usize,
    pos_frac: &mut u32,
    out_pos: usize,
    samples_to_do: usize,
    buffer_size: usize,
) {
    let channels = source.channels;
    let increment = source.params.step;

    for i in 0..channels {
        let dry_send = source.params.dry_gains[i];

        let mut pos = 0;
        let mut frac = *pos_frac;
        let mut out = out_pos;

        if out == 0 {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step_correction(i, value);
            for c in 0..MAX_CHANNELS {
                device.click_removal[c] -= value * dry_send[c];
            }
        }
        for _ in 0..buffer_size {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step(i, value);
            for c in 0..MAX_CHANNELS {
                device.dry_buffer[out][c] += value * dry_send[c];
            }

            frac += increment;
            pos += (frac >> FRACTION_BITS) as usize;
            frac &= FRACTION_MASK;
            out += 1;
        }
        if out == samples_to_do {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step_correction(i, value);
            for c in 0..MAX_CHANNELS {
                device.pending_clicks[c] += value * dry_send[c];
            }
        }
    }

    mix_sends::<S, K>(source, device, window, *pos_frac, out_pos, samples_to_do, buffer_size);

    advance_position(pos_int, pos_frac, increment, buffer_size);
}

/// Advance the playback position by `buffer_size` output steps. Equivalent
/// to stepping the fractional phase sample by sample with the carry folded
/// into the integer position each step.
#[inline]
pub(crate) fn advance_position(
    pos_int: &mut usize,
    pos_frac: &mut u32,
    increment: u32,
    buffer_size: usize,
) {
    let total = *pos_frac as u64 + increment as u64 * buffer_size as u64;
    *pos_int += (total >> FRACTION_BITS) as usize;
    *pos_frac = (total & FRACTION_MASK as u64) as u32;
}

/// Feed the auxiliary sends: the one-pole-filtered source stream, scaled by
/// the send's wet gain, accumulated into each connected slot's mono wet
/// buffer. Sends without a slot and slots holding a null effect are skipped.
pub(crate) fn mix_sends<S: Sample, K: Kernel>(
    source: &mut Source,
    device: &mut Device,
    window: Window,
    entry_frac: u32,
    out_pos: usize,
    samples_to_do: usize,
    buffer_size: usize,
) {
    let channels = source.channels;
    let increment = source.params.step;
    let num_sends = device.num_aux_sends.min(MAX_SENDS);

    for out in 0..num_sends {
        let Some(slot_index) = source.params.sends[out].slot else {
            continue;
        };
        if device.effect_slots[slot_index].effect == EffectType::Null {
            continue;
        }
        let send = &mut source.params.sends[out];
        let slot = &mut device.effect_slots[slot_index];
        let wet_gain = send.wet_gain;

        for i in 0..channels {
            let mut pos = 0;
            let mut frac = entry_frac;
            let mut out_idx = out_pos;

            if out_idx == 0 {
                let value =
                    K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
                let value = send.iir_filter.step_correction(i, value);
                slot.click_removal[0] -= value * wet_gain;
            }
            for _ in 0..buffer_size {
                let value =
                    K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
                let value = send.iir_filter.step(i, value);
                slot.wet_buffer[out_idx] += value * wet_gain;

                frac += increment;
                pos += (frac >> FRACTION_BITS) as usize;
                frac &= FRACTION_MASK;
                out_idx += 1;
            }
            if out_idx == samples_to_do {
                let value =
                    K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
                let value = send.iir_filter.step_correction(i, value);
                slot.pending_clicks[0] += value * wet_gain;
            }
        }
    }
}
