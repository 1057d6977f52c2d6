//! The mix hot path must not touch the allocator.

use assert_no_alloc::*;
use spatmix::prelude::*;
use std::sync::Arc;

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

#[test]
fn mix_source_does_not_allocate() {
    let samples: Vec<f32> = (0..256).map(|k| (k as f32 * 0.1).sin()).collect();
    let buffer = Arc::new(Buffer::from_f32(&samples, 1).with_loop_points(0, 256));

    let mut plain = Source::new_static(buffer.clone());
    plain.looping = true;
    plain.resampler = Resampler::Cubic;
    plain.update_mixer(false);
    plain.params.dry_gains[0][FRONT_LEFT] = 1.0;
    plain.params.sends[0].slot = Some(0);
    plain.params.sends[0].wet_gain = 0.5;
    plain.play();

    let mut binaural = Source::new_static(buffer);
    binaural.looping = true;
    binaural.resampler = Resampler::Linear;
    binaural.update_mixer(true);
    binaural.params.hrtf.coeffs[0][0] = [0.7, 0.7];
    binaural.hrtf.counter = 32;
    binaural.play();

    let mut device = Device::new(512, 1);
    device.effect_slots[0].effect = EffectType::Reverb;

    assert_no_alloc(|| {
        for _ in 0..8 {
            mix_source(&mut plain, &mut device, 512);
            mix_source(&mut binaural, &mut device, 512);
        }
    });
    assert_eq!(plain.state, SourceState::Playing);
    assert_eq!(binaural.state, SourceState::Playing);
}
