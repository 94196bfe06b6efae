//! Tolerance validation and threshold derivation.
//!
//! A tolerance in `[0, 1]` is turned into two integer budgets before every
//! search:
//!
//! - `pixel`: the largest `|ΔR| + |ΔG| + |ΔB|` any single pixel pair may have,
//!   `round(3 * 256 * 2 * tolerance)`;
//! - `window`: the largest total difference over the whole sample-sized
//!   window, `round(tolerance * w * h * 3 * 255)`.
//!
//! Both use round-half-up. The per-pixel budget scales with `2 * tolerance`
//! while the window budget scales with `tolerance`; the factor is fixed.

use crate::util::math::round_half_up;
use crate::util::{LocateError, LocateResult};

/// Largest per-channel difference.
const CHANNEL_MAX: u64 = 255;
/// Colour channels compared per pixel (alpha is ignored).
const CHANNELS: u64 = 3;
/// Scaling of the per-pixel budget relative to the window budget.
const PIXEL_TOLERANCE_FACTOR: f64 = 2.0;

/// Checks that a tolerance is finite and within `[0, 1]`.
pub fn validate_tolerance(tolerance: f64) -> LocateResult<()> {
    if !tolerance.is_finite() {
        return Err(LocateError::InvalidInput("tolerance must be finite"));
    }
    if !(0.0..=1.0).contains(&tolerance) {
        return Err(LocateError::InvalidInput("tolerance must be within [0, 1]"));
    }
    Ok(())
}

/// Integer budgets derived from a tolerance for one sample size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    /// Maximum allowed difference for a single pixel pair.
    pub pixel: u32,
    /// Maximum allowed total difference across the window.
    pub window: u64,
    /// Theoretical maximum total difference for the sample size.
    pub max_total: u64,
}

impl Thresholds {
    /// Derives both budgets for a `sample_width x sample_height` sample.
    pub fn derive(tolerance: f64, sample_width: usize, sample_height: usize) -> Self {
        let pixel_tolerance = PIXEL_TOLERANCE_FACTOR * tolerance;
        let pixel = round_half_up(CHANNELS as f64 * 256.0 * pixel_tolerance);
        let max_total = (sample_width as u64)
            .saturating_mul(sample_height as u64)
            .saturating_mul(CHANNELS * CHANNEL_MAX);
        let window = round_half_up(tolerance * max_total as f64);
        Self {
            pixel: pixel.min(u32::MAX as u64) as u32,
            window,
            max_total,
        }
    }

    /// Converts an accepted window's total difference to a similarity score.
    pub fn similarity(&self, diff: u64) -> f64 {
        if self.max_total == 0 {
            return 1.0;
        }
        1.0 - diff as f64 / self.max_total as f64
    }
}
