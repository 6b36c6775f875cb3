//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Floor a non-negative f64 into a `usize` index, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// Convert a `usize` length to f64.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Integer ceiling division for a non-negative numerator and positive divisor.
///
/// Returns `None` when the divisor is not positive.
#[must_use]
pub fn ceil_div(numerator: i64, divisor: i64) -> Option<i64> {
    if divisor <= 0 {
        return None;
    }
    let quotient = numerator.div_euclid(divisor);
    if numerator.rem_euclid(divisor) == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

/// Saturating conversion from i64 into u32.
#[must_use]
pub fn i64_to_u32_saturating(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
