//! Standard normal helpers shared by the analytic engine and the implied-vol solver.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Standard normal CDF Φ(x). Handles ±∞.
pub(crate) fn norm_cdf(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    Normal::standard().cdf(x)
}

/// Standard normal PDF φ(x). Zero at ±∞.
pub(crate) fn norm_pdf(x: f64) -> f64 {
    if x.is_infinite() {
        return 0.0;
    }
    Normal::standard().pdf(x)
}
