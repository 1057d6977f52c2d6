//! Binaural (HRTF) mixing path tests.

#![allow(clippy::needless_range_loop)]

use funutd::*;
use spatmix::prelude::*;
use std::sync::Arc;

fn hrtf_source(samples: &[f32]) -> Source {
    let mut source = Source::new_static(Arc::new(Buffer::from_f32(samples, 1)));
    source.resampler = Resampler::Point;
    source.update_mixer(true);
    source.play();
    source
}

fn ears(device: &Device, len: usize) -> Vec<[f32; 2]> {
    device.dry_buffer[..len]
        .iter()
        .map(|f| [f[FRONT_LEFT], f[FRONT_RIGHT]])
        .collect()
}

#[test]
fn identity_fir_passes_input() {
    let samples = [0.0, 0.25, -0.5, 1.0];
    let mut source = hrtf_source(&samples);
    source.params.hrtf.coeffs[0][0] = [1.0, 1.0];

    let mut device = Device::new(4, 0);
    mix_source(&mut source, &mut device, 4);

    let got = ears(&device, 4);
    for k in 0..4 {
        assert!((got[k][0] - samples[k]).abs() < 1.0e-6, "left {}: {}", k, got[k][0]);
        assert!((got[k][1] - samples[k]).abs() < 1.0e-6, "right {}: {}", k, got[k][1]);
    }
    // Binaural output lands in the front pair only.
    for frame in &device.dry_buffer {
        for c in 2..MAX_CHANNELS {
            assert_eq!(frame[c], 0.0);
        }
    }
}

#[test]
fn per_ear_delays_shift_input() {
    let samples = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let mut source = hrtf_source(&samples);
    source.params.hrtf.coeffs[0][0] = [1.0, 1.0];
    source.params.hrtf.delay[0] = [2 << 16, 3 << 16];

    let mut device = Device::new(6, 0);
    mix_source(&mut source, &mut device, 6);

    let got = ears(&device, 6);
    let left = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    let right = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    for k in 0..6 {
        assert!((got[k][0] - left[k]).abs() < 1.0e-6, "left {}: {}", k, got[k][0]);
        assert!((got[k][1] - right[k]).abs() < 1.0e-6, "right {}: {}", k, got[k][1]);
    }
}

#[test]
fn ramp_with_zero_steps_matches_steady() {
    let mut rnd = Rnd::from_u64(5);
    let samples: Vec<f32> = (0..24).map(|_| rnd.f32() * 2.0 - 1.0).collect();

    let mut coeffs = [[0.0f32; 2]; HRIR_LENGTH];
    for c in 0..HRIR_LENGTH {
        coeffs[c] = [rnd.f32() * 0.5, rnd.f32() * 0.5];
    }

    let mut outputs = Vec::new();
    for counter in [0usize, 64] {
        let mut source = hrtf_source(&samples);
        source.params.hrtf.coeffs[0] = coeffs;
        source.params.hrtf.delay[0] = [1 << 16, 2 << 16];
        source.params.iir_filter = LowPassFilter::new(0.2);
        source.hrtf.counter = counter;

        let mut device = Device::new(16, 0);
        mix_source(&mut source, &mut device, 16);
        outputs.push(ears(&device, 16));
    }
    for k in 0..16 {
        for e in 0..2 {
            assert!(
                (outputs[0][k][e] - outputs[1][k][e]).abs() < 1.0e-6,
                "sample {} ear {}: steady {} ramped {}",
                k,
                e,
                outputs[0][k][e],
                outputs[1][k][e]
            );
        }
    }
}

#[test]
fn coeff_ramp_reaches_target() {
    let samples = [1.0; 12];
    let mut source = hrtf_source(&samples);
    source.params.hrtf.coeffs[0][0] = [1.0, 1.0];
    source.params.hrtf.coeff_step[0] = [0.25, 0.25];
    source.hrtf.counter = 4;

    let mut device = Device::new(12, 0);
    mix_source(&mut source, &mut device, 12);

    let got = ears(&device, 12);
    for k in 0..12 {
        let expected = (k as f32 * 0.25).min(1.0);
        assert!(
            (got[k][0] - expected).abs() < 1.0e-6,
            "sample {}: got {} expected {}",
            k,
            got[k][0],
            expected
        );
    }
    assert_eq!(source.hrtf.counter, 0);
}

#[test]
fn silent_hrtf_source_adds_nothing() {
    let mut rnd = Rnd::from_u64(13);
    let mut source = hrtf_source(&[0.0; 32]);
    for c in 0..HRIR_LENGTH {
        source.params.hrtf.coeffs[0][c] = [rnd.f32(), rnd.f32()];
        source.params.hrtf.coeff_step[c] = [rnd.f32() * 0.01, rnd.f32() * 0.01];
    }
    source.params.hrtf.delay[0] = [
        ((rnd.u64() % 8) as u32) << 16,
        ((rnd.u64() % 8) as u32) << 16,
    ];
    source.params.iir_filter = LowPassFilter::new(0.4);
    source.hrtf.counter = 8;

    let mut device = Device::new(16, 0);
    mix_source(&mut source, &mut device, 16);

    for frame in &device.dry_buffer {
        for c in 0..MAX_CHANNELS {
            assert_eq!(frame[c], 0.0);
        }
    }
    for c in 0..MAX_CHANNELS {
        assert_eq!(device.click_removal[c], 0.0);
        assert_eq!(device.pending_clicks[c], 0.0);
    }
}

#[test]
fn leading_click_cancels_first_sample() {
    let samples = [0.8, -0.2, 0.4, -0.6, 0.3, 0.1, 0.0, 0.5];
    let mut source = hrtf_source(&samples);
    for c in 0..4 {
        source.params.hrtf.coeffs[0][c] = [0.5 - 0.1 * c as f32, 0.4 - 0.1 * c as f32];
    }
    source.params.hrtf.delay[0] = [1 << 16, 2 << 16];
    source.params.iir_filter = LowPassFilter::new(0.3);

    let mut device = Device::new(8, 0);
    mix_source(&mut source, &mut device, 8);

    assert!(
        (device.click_removal[FRONT_LEFT] + device.dry_buffer[0][FRONT_LEFT]).abs() < 1.0e-6
    );
    assert!(
        (device.click_removal[FRONT_RIGHT] + device.dry_buffer[0][FRONT_RIGHT]).abs() < 1.0e-6
    );
}

#[test]
fn aux_sends_tap_the_unconvolved_stream() {
    // Even in HRTF mode the wet path carries the plain filtered source, not
    // the binaural render.
    let samples = [0.5, -0.5, 0.25, -0.25];
    let mut source = hrtf_source(&samples);
    source.params.hrtf.coeffs[0][0] = [0.0, 0.0];
    source.params.sends[0].slot = Some(0);
    source.params.sends[0].wet_gain = 1.0;

    let mut device = Device::new(4, 1);
    device.effect_slots[0].effect = EffectType::Reverb;
    mix_source(&mut source, &mut device, 4);

    for k in 0..4 {
        // Zero FIR taps silence the ears but not the send.
        assert_eq!(device.dry_buffer[k][FRONT_LEFT], 0.0);
        let wet = device.effect_slots[0].wet_buffer[k];
        assert!((wet - samples[k]).abs() < 1.0e-6, "wet {}: {}", k, wet);
    }
}
