//! Input validation helpers.
//!
//! Standardizes validation across the crate using `!is_finite()` to reject
//! NaN, +Inf, and -Inf uniformly.

use crate::error::{PricingError, Result};

/// Validate that a value is strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::InvalidArgument {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is non-negative and finite (rejects NaN, Inf, negatives).
pub(crate) fn validate_non_negative(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::InvalidArgument {
            message: format!("{name} must be non-negative and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() {
        return Err(PricingError::InvalidArgument {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate a correlation coefficient in \[−1, 1\].
pub(crate) fn validate_correlation(value: f64, name: &str) -> Result<f64> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(PricingError::InvalidArgument {
            message: format!("{name} must be in [-1, 1], got {value}"),
        });
    }
    Ok(value)
}

/// Validate the Black-Scholes auxiliary term selector `i` in `d_i`.
pub(crate) fn validate_d_index(i: u8) -> Result<u8> {
    if i != 1 && i != 2 {
        return Err(PricingError::InvalidArgument {
            message: format!("d-index must be 1 or 2, got {i}"),
        });
    }
    Ok(i)
}

/// Validate that a draw buffer has exactly the `(time_steps, num_sims)` shape
/// a simulation expects.
pub(crate) fn validate_shape(
    actual: (usize, usize),
    expected: (usize, usize),
    name: &str,
) -> Result<()> {
    if actual != expected {
        return Err(PricingError::InvalidArgument {
            message: format!(
                "{name} must have shape (time_steps, num_sims) = {expected:?}, got {actual:?}"
            ),
        });
    }
    Ok(())
}
