//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 to the nearest integer and clamp it into `0..=100`, returning 0 for NaN.
///
/// Halves round away from zero, matching the browser's `Math.round` for the
/// non-negative values this engine produces.
#[must_use]
pub fn round_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.round().clamp(0.0, 100.0);
    cast::<f64, u8>(clamped).unwrap_or(0)
}

/// Clamp a f64 into the unit interval, returning 0.0 for non-finite values.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Convert a count into f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}
