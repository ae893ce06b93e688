//! Market conventions shared by every engine.
//!
//! Simulation engines discretize the life of an option into trading hours:
//! 252 trading days a year, 6.5 trading hours a day. The same step count also
//! sizes the finite-difference bumps used for simulated Greeks.

use crate::error::{self, PricingError};
use crate::validate::validate_positive;

/// Trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trading hours per trading day.
pub const TRADING_HOURS_PER_DAY: f64 = 6.5;

/// Number of hourly simulation steps in `expiry` years: `⌊T × 252 × 6.5⌋`.
///
/// # Errors
/// Returns [`PricingError::InvalidArgument`] for a non-positive or non-finite
/// expiry, and [`PricingError::DegenerateInput`] when the expiry is shorter
/// than one trading hour so that no step fits.
///
/// # Examples
/// ```
/// use optpricing::conventions::time_steps;
/// assert_eq!(time_steps(1.0)?, 1638);
/// assert!(time_steps(1e-5).is_err());
/// # Ok::<(), optpricing::PricingError>(())
/// ```
pub fn time_steps(expiry: f64) -> error::Result<usize> {
    validate_positive(expiry, "expiry")?;
    let steps = (expiry * TRADING_DAYS_PER_YEAR * TRADING_HOURS_PER_DAY).floor();
    if steps < 1.0 {
        return Err(PricingError::DegenerateInput {
            message: format!("expiry {expiry} is shorter than one trading hour; zero time steps"),
        });
    }
    Ok(steps as usize)
}

/// Discount factor `e^(−rT)`.
pub fn discount_factor(rate: f64, expiry: f64) -> f64 {
    (-rate * expiry).exp()
}

/// Compute forward price from spot: F = S · exp(r · T).
pub fn forward_price(spot: f64, rate: f64, expiry: f64) -> f64 {
    spot * (rate * expiry).exp()
}
