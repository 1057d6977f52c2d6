//! Voice filters.

use num_complex::Complex64;

use super::MAX_CHANNELS;

/// Derive the one-pole coefficient for a high-frequency `gain` at the
/// angular cutoff whose cosine is `cos_w`. Gains close to unity disable the
/// filter; very small gains are clamped to keep the coefficient away from 1.
pub fn low_pass_coeff(gain: f32, cos_w: f32) -> f32 {
    if gain >= 0.9999 {
        return 0.0;
    }
    let g = gain.max(0.001);
    (1.0 - g * cos_w - (2.0 * g * (1.0 - cos_w) - g * g * (1.0 - cos_w * cos_w)).sqrt())
        / (1.0 - g)
}

/// Two-pole low-pass voice filter: two cascaded one-pole sections sharing a
/// coefficient, with independent state per source channel.
///
/// [`step`](Self::step) advances the channel state and returns the filtered
/// sample. [`step_correction`](Self::step_correction) returns the identical
/// output without committing state; the block-boundary click-removal passes
/// use it to probe what the filter would emit, leaving the state to the first
/// real sample of the block.
#[derive(Clone, Debug, Default)]
pub struct LowPassFilter {
    coeff: f32,
    history: [[f32; 2]; MAX_CHANNELS],
}

impl LowPassFilter {
    /// Create a filter with a precomputed coefficient.
    pub fn new(coeff: f32) -> Self {
        Self {
            coeff,
            history: Default::default(),
        }
    }

    /// Create a pass-through filter.
    pub fn pass_through() -> Self {
        Self::new(0.0)
    }

    #[inline]
    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    /// Set the coefficient. State is kept; the caller ramps gains elsewhere.
    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff = coeff;
    }

    /// Clear the filter state of every channel.
    pub fn reset(&mut self) {
        self.history = Default::default();
    }

    /// Advance the state of `channel` and return the filtered sample.
    #[inline]
    pub fn step(&mut self, channel: usize, input: f32) -> f32 {
        let a = self.coeff;
        let history = &mut self.history[channel];
        let mut output = input;
        output += (history[0] - output) * a;
        history[0] = output;
        output += (history[1] - output) * a;
        history[1] = output;
        output
    }

    /// Return the sample [`step`](Self::step) would produce for `channel`
    /// without advancing the state.
    #[inline]
    pub fn step_correction(&self, channel: usize, input: f32) -> f32 {
        let a = self.coeff;
        let history = &self.history[channel];
        let mut output = input;
        output += (history[0] - output) * a;
        output += (history[1] - output) * a;
        output
    }

    /// Frequency response at `omega` expressed as a fraction of the sampling
    /// rate.
    pub fn response(&self, omega: f64) -> Complex64 {
        section_response(self.coeff, omega).powu(2)
    }
}

/// One-pole low-pass filter used by the auxiliary send paths, with the same
/// two entry points as [`LowPassFilter`].
#[derive(Clone, Debug, Default)]
pub struct OnePoleFilter {
    coeff: f32,
    history: [f32; MAX_CHANNELS],
}

impl OnePoleFilter {
    pub fn new(coeff: f32) -> Self {
        Self {
            coeff,
            history: Default::default(),
        }
    }

    pub fn pass_through() -> Self {
        Self::new(0.0)
    }

    #[inline]
    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff = coeff;
    }

    pub fn reset(&mut self) {
        self.history = Default::default();
    }

    /// Advance the state of `channel` and return the filtered sample.
    #[inline]
    pub fn step(&mut self, channel: usize, input: f32) -> f32 {
        let output = input + (self.history[channel] - input) * self.coeff;
        self.history[channel] = output;
        output
    }

    /// Return the sample [`step`](Self::step) would produce for `channel`
    /// without advancing the state.
    #[inline]
    pub fn step_correction(&self, channel: usize, input: f32) -> f32 {
        input + (self.history[channel] - input) * self.coeff
    }

    /// Frequency response at `omega` expressed as a fraction of the sampling
    /// rate.
    pub fn response(&self, omega: f64) -> Complex64 {
        section_response(self.coeff, omega)
    }
}

/// Response of a single `y = x + (h - x) * a` section.
fn section_response(coeff: f32, omega: f64) -> Complex64 {
    let a = coeff as f64;
    let z1 = Complex64::from_polar(1.0, -std::f64::consts::TAU * omega);
    Complex64::new(1.0 - a, 0.0) / (Complex64::new(1.0, 0.0) - Complex64::new(a, 0.0) * z1)
}
