//! Integer helpers for the difference metric.

/// Rounds a non-negative value to the nearest integer, halves rounding up.
///
/// Negative and NaN inputs clamp to zero.
pub(crate) fn round_half_up(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor() as u64
}

/// Absolute difference of two channel values.
#[inline]
pub(crate) fn channel_diff(a: u8, b: u8) -> u32 {
    a.abs_diff(b) as u32
}
