//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the u16 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_u16(value: f64) -> u16 {
    if !value.is_finite() {
        return 0;
    }
    let clamped = value.clamp(0.0, f64::from(u16::MAX)).round();
    cast::<f64, u16>(clamped).unwrap_or(0)
}

/// Convert a draw from an inclusive integer range into a score, flooring negatives at zero.
#[must_use]
pub fn i32_to_u16(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Fraction `part / total`, returning 0.0 for an empty total.
#[must_use]
pub fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    usize_to_f64(part) / usize_to_f64(total)
}
