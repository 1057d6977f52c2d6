//! Head-related transfer function mixer.
//!
//! The HRTF path replaces the panning-gain dry mix: each source channel is
//! resampled and filtered like the plain path, written into a per-channel
//! history ring, read back once per ear at the ear's integer sample delay,
//! and convolved with the per-ear FIR taps into an output ring. Only the
//! front left/right dry channels receive the result. While a source's ramp
//! counter runs, both the tap coefficients and the 16.16 fixed-point delays
//! interpolate linearly toward their targets; the steady phase then runs
//! with constant taps and collapsed integer delays.

use super::device::{Device, FRONT_LEFT, FRONT_RIGHT};
use super::mix::{advance_position, mix_sends};
use super::resample::{Kernel, Window};
use super::sample::Sample;
use super::source::Source;
use super::{FRACTION_BITS, FRACTION_MASK, HRIR_LENGTH, HRIR_MASK, SRC_HISTORY_MASK};

/// Accumulate one delayed sample pair through the full tap set. The two
/// ears' multiplications are independent, so this is free to vectorize.
#[inline]
pub(crate) fn apply_coeffs(
    offset: u32,
    values: &mut [[f32; 2]; HRIR_LENGTH],
    coeffs: &[[f32; 2]; HRIR_LENGTH],
    left: f32,
    right: f32,
) {
    for c in 0..HRIR_LENGTH {
        let off = offset.wrapping_add(c as u32) as usize & HRIR_MASK;
        values[off][0] += coeffs[c][0] * left;
        values[off][1] += coeffs[c][1] * right;
    }
}

/// Resample, filter and binaurally convolve one source into the device's
/// front left/right dry channels. The aux-send pass taps the pre-convolution
/// stream, exactly as in the plain mixer.
pub(crate) fn mix_hrtf<S: Sample, K: Kernel>(
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
    let coeff_step = source.params.hrtf.coeff_step;
    let delay_step = source.params.hrtf.delay_step;

    for i in 0..channels {
        let target_coeffs = &source.params.hrtf.coeffs[i];
        let target_delay = &source.params.hrtf.delay[i];
        let mut counter = source.hrtf.counter.max(out_pos) - out_pos;
        let mut offset = source.hrtf.offset.wrapping_add(out_pos as u32);
        let history = &mut source.hrtf.history[i];
        let values = &mut source.hrtf.values[i];

        let mut pos = 0;
        let mut frac = *pos_frac;
        let mut out = out_pos;

        // Back-project coefficients and delays to the start of the ramp so
        // stepping them forward lands exactly on the targets when the
        // counter runs out. The 32768 bias rounds the 16.16 delays to the
        // nearest sample.
        let mut coeffs = [[0.0f32; 2]; HRIR_LENGTH];
        for c in 0..HRIR_LENGTH {
            coeffs[c][0] = target_coeffs[c][0] - coeff_step[c][0] * counter as f32;
            coeffs[c][1] = target_coeffs[c][1] - coeff_step[c][1] * counter as f32;
        }
        let mut delay = [
            target_delay[0]
                .wrapping_sub(delay_step[0].wrapping_mul(counter as i32) as u32)
                .wrapping_add(32768),
            target_delay[1]
                .wrapping_sub(delay_step[1].wrapping_mul(counter as i32) as u32)
                .wrapping_add(32768),
        ];

        if out == 0 {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step_correction(i, value);

            history[offset as usize & SRC_HISTORY_MASK] = value;
            let left = history[offset.wrapping_sub(delay[0] >> 16) as usize & SRC_HISTORY_MASK];
            let right = history[offset.wrapping_sub(delay[1] >> 16) as usize & SRC_HISTORY_MASK];

            device.click_removal[FRONT_LEFT] -=
                values[offset.wrapping_add(1) as usize & HRIR_MASK][0] + coeffs[0][0] * left;
            device.click_removal[FRONT_RIGHT] -=
                values[offset.wrapping_add(1) as usize & HRIR_MASK][1] + coeffs[0][1] * right;
        }
        let mut buffer_idx = 0;
        while buffer_idx < buffer_size && counter > 0 {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step(i, value);

            history[offset as usize & SRC_HISTORY_MASK] = value;
            let left = history[offset.wrapping_sub(delay[0] >> 16) as usize & SRC_HISTORY_MASK];
            let right = history[offset.wrapping_sub(delay[1] >> 16) as usize & SRC_HISTORY_MASK];

            delay[0] = delay[0].wrapping_add_signed(delay_step[0]);
            delay[1] = delay[1].wrapping_add_signed(delay_step[1]);

            values[offset as usize & HRIR_MASK] = [0.0, 0.0];
            offset = offset.wrapping_add(1);

            for c in 0..HRIR_LENGTH {
                let off = offset.wrapping_add(c as u32) as usize & HRIR_MASK;
                values[off][0] += coeffs[c][0] * left;
                values[off][1] += coeffs[c][1] * right;
                coeffs[c][0] += coeff_step[c][0];
                coeffs[c][1] += coeff_step[c][1];
            }

            device.dry_buffer[out][FRONT_LEFT] += values[offset as usize & HRIR_MASK][0];
            device.dry_buffer[out][FRONT_RIGHT] += values[offset as usize & HRIR_MASK][1];

            frac += increment;
            pos += (frac >> FRACTION_BITS) as usize;
            frac &= FRACTION_MASK;
            out += 1;
            buffer_idx += 1;
            counter -= 1;
        }

        // Ramp finished (or never ran): collapse the delays to whole
        // samples and convolve with constant coefficients.
        delay[0] >>= 16;
        delay[1] >>= 16;
        while buffer_idx < buffer_size {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step(i, value);

            history[offset as usize & SRC_HISTORY_MASK] = value;
            let left = history[offset.wrapping_sub(delay[0]) as usize & SRC_HISTORY_MASK];
            let right = history[offset.wrapping_sub(delay[1]) as usize & SRC_HISTORY_MASK];

            values[offset as usize & HRIR_MASK] = [0.0, 0.0];
            offset = offset.wrapping_add(1);

            apply_coeffs(offset, values, &coeffs, left, right);
            device.dry_buffer[out][FRONT_LEFT] += values[offset as usize & HRIR_MASK][0];
            device.dry_buffer[out][FRONT_RIGHT] += values[offset as usize & HRIR_MASK][1];

            frac += increment;
            pos += (frac >> FRACTION_BITS) as usize;
            frac &= FRACTION_MASK;
            out += 1;
            buffer_idx += 1;
        }
        if out == samples_to_do {
            let value = K::sample::<S>(window, window.origin() + pos * channels + i, channels, frac);
            let value = source.params.iir_filter.step_correction(i, value);

            history[offset as usize & SRC_HISTORY_MASK] = value;
            let left = history[offset.wrapping_sub(delay[0]) as usize & SRC_HISTORY_MASK];
            let right = history[offset.wrapping_sub(delay[1]) as usize & SRC_HISTORY_MASK];

            device.pending_clicks[FRONT_LEFT] +=
                values[offset.wrapping_add(1) as usize & HRIR_MASK][0] + coeffs[0][0] * left;
            device.pending_clicks[FRONT_RIGHT] +=
                values[offset.wrapping_add(1) as usize & HRIR_MASK][1] + coeffs[0][1] * right;
        }
    }

    mix_sends::<S, K>(source, device, window, *pos_frac, out_pos, samples_to_do, buffer_size);

    advance_position(pos_int, pos_frac, increment, buffer_size);
}
