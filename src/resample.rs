//! Fractional-phase resampling kernels.

use super::math::{lerp, spline};
use super::sample::Sample;
use super::FRACTION_ONE;

/// Resampling method of a source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Resampler {
    /// Nearest sample.
    Point,
    /// Two-point linear interpolation.
    #[default]
    Linear,
    /// Four-point Catmull-Rom interpolation.
    Cubic,
}

impl Resampler {
    /// Source samples the kernel reads before the read head.
    #[inline]
    pub fn pre_padding(self) -> usize {
        match self {
            Resampler::Point => 0,
            Resampler::Linear => 0,
            Resampler::Cubic => 1,
        }
    }

    /// Source samples the kernel reads past the read head.
    #[inline]
    pub fn padding(self) -> usize {
        match self {
            Resampler::Point => 0,
            Resampler::Linear => 1,
            Resampler::Cubic => 2,
        }
    }
}

/// View of an assembled source window.
///
/// The window bytes include `pre_padding` frames ahead of the playable
/// region; `origin` is the element index of the first playable frame, so a
/// kernel may read up to `pre_padding * channels` elements behind an index
/// without leaving the window.
#[derive(Copy, Clone)]
pub struct Window<'a> {
    bytes: &'a [u8],
    origin: usize,
}

impl<'a> Window<'a> {
    pub fn new(bytes: &'a [u8], origin: usize) -> Self {
        Self { bytes, origin }
    }

    /// Element index of the first playable frame.
    #[inline]
    pub fn origin(self) -> usize {
        self.origin
    }

    /// Decode the element at the absolute index.
    #[inline]
    pub fn get<S: Sample>(self, index: usize) -> f32 {
        S::decode(&self.bytes[index * S::SIZE..])
    }
}

/// Interpolation kernel: one output sample from a window position, a channel
/// stride and a fractional phase. `index` is absolute within the window and
/// already accounts for the pre-padding origin.
pub trait Kernel: 'static {
    fn sample<S: Sample>(win: Window, index: usize, stride: usize, frac: u32) -> f32;
}

/// Nearest-sample kernel.
pub struct Point;

/// Linear interpolation kernel.
pub struct Lerp;

/// Catmull-Rom kernel over `v[-s], v[0], v[s], v[2s]`.
pub struct Cubic;

impl Kernel for Point {
    #[inline]
    fn sample<S: Sample>(win: Window, index: usize, _stride: usize, _frac: u32) -> f32 {
        win.get::<S>(index)
    }
}

impl Kernel for Lerp {
    #[inline]
    fn sample<S: Sample>(win: Window, index: usize, stride: usize, frac: u32) -> f32 {
        lerp(
            win.get::<S>(index),
            win.get::<S>(index + stride),
            frac as f32 * (1.0 / FRACTION_ONE as f32),
        )
    }
}

impl Kernel for Cubic {
    #[inline]
    fn sample<S: Sample>(win: Window, index: usize, stride: usize, frac: u32) -> f32 {
        spline(
            win.get::<S>(index - stride),
            win.get::<S>(index),
            win.get::<S>(index + stride),
            win.get::<S>(index + stride * 2),
            frac as f32 * (1.0 / FRACTION_ONE as f32),
        )
    }
}
