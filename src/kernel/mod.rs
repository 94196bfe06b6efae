//! Window difference kernels.
//!
//! A kernel compares the sample against one sample-sized window of the canvas
//! and either rejects it or returns the total channel difference. Rejection
//! happens as soon as one pixel exceeds the per-pixel budget or the running
//! total exceeds the window budget. Because the running total never decreases,
//! where a kernel checks the budgets does not change its answer, only how soon
//! it gives up.

use crate::image::PixelView;
use crate::tolerance::Thresholds;
use crate::util::math::channel_diff;

/// Sum of absolute R, G and B differences of two RGBA pixels; alpha is ignored.
#[inline]
pub fn pixel_delta(canvas_px: &[u8], sample_px: &[u8]) -> u32 {
    channel_diff(canvas_px[0], sample_px[0])
        + channel_diff(canvas_px[1], sample_px[1])
        + channel_diff(canvas_px[2], sample_px[2])
}

/// Kernel trait for evaluating a single window placement.
pub trait WindowKernel {
    /// Compares `sample` with the canvas window whose top-left is `(x, y)`.
    ///
    /// Returns the total difference when the window is accepted, `None` when
    /// either budget is exceeded. The caller guarantees the window lies inside
    /// the canvas.
    fn window_diff(
        canvas: PixelView<'_>,
        sample: PixelView<'_>,
        x: usize,
        y: usize,
        thresholds: &Thresholds,
    ) -> Option<u64>;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

/// Kernel used by the public search functions.
#[cfg(not(feature = "simd"))]
pub type DefaultKernel = scalar::ScalarKernel;

/// Kernel used by the public search functions.
#[cfg(feature = "simd")]
pub type DefaultKernel = simd::SimdKernel;
