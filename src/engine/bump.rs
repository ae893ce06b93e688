//! Finite-difference sensitivities shared by the simulation engines.
//!
//! `value_at(dx)` must revalue the contract with the bumped input shifted by
//! `dx` against the same draw buffer for every call; the schemes below only
//! combine the results.

use tracing::debug;

use crate::error::{self, PricingError};
use crate::types::{Greek, GreekResult, Method};

fn check_step(greek: Greek, step: f64) -> error::Result<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(PricingError::InvalidArgument {
            message: format!("{greek} bump must be positive and finite, got {step}"),
        });
    }
    Ok(())
}

/// `(V(x + h) − V(x)) / h`.
pub(crate) fn forward_difference<F>(
    greek: Greek,
    step: f64,
    mut value_at: F,
) -> error::Result<GreekResult>
where
    F: FnMut(f64) -> error::Result<f64>,
{
    check_step(greek, step)?;
    let up = value_at(step)?;
    let base = value_at(0.0)?;
    let value = (up - base) / step;
    debug!(%greek, step, up, base, value, "forward difference");
    Ok(GreekResult {
        greek,
        value,
        method: Method::ForwardDifference { step },
    })
}

/// `(V(x + h) − 2V(x) + V(x − h)) / h²`.
pub(crate) fn central_second_difference<F>(
    greek: Greek,
    step: f64,
    mut value_at: F,
) -> error::Result<GreekResult>
where
    F: FnMut(f64) -> error::Result<f64>,
{
    check_step(greek, step)?;
    let up = value_at(step)?;
    let base = value_at(0.0)?;
    let down = value_at(-step)?;
    let value = (up - 2.0 * base + down) / (step * step);
    debug!(%greek, step, up, base, down, value, "central second difference");
    Ok(GreekResult {
        greek,
        value,
        method: Method::CentralDifference { step },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forward_difference_of_quadratic() {
        // f(x) = x² at x = 3 → (f(3 + h) − f(3)) / h = 6 + h
        let g = forward_difference(Greek::Delta, 0.01, |dx| Ok((3.0 + dx) * (3.0 + dx))).unwrap();
        assert_relative_eq!(g.value, 6.01, max_relative = 1e-12);
        assert_eq!(g.method, Method::ForwardDifference { step: 0.01 });
        assert_eq!(g.greek, Greek::Delta);
    }

    #[test]
    fn central_second_difference_of_cubic() {
        // f(x) = x³ at x = 2 → f''(2) = 12, exact for cubics up to rounding
        let g = central_second_difference(Greek::Gamma, 1e-3, |dx| Ok((2.0 + dx).powi(3))).unwrap();
        assert_relative_eq!(g.value, 12.0, max_relative = 1e-5);
        assert_eq!(g.method, Method::CentralDifference { step: 1e-3 });
    }

    #[test]
    fn propagates_valuation_errors() {
        let res = forward_difference(Greek::Rho, 0.1, |dx| {
            if dx > 0.0 {
                Err(PricingError::DegenerateInput {
                    message: "boom".into(),
                })
            } else {
                Ok(1.0)
            }
        });
        assert!(matches!(res, Err(PricingError::DegenerateInput { .. })));
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(forward_difference(Greek::Vega, 0.0, |_| Ok(1.0)).is_err());
        assert!(central_second_difference(Greek::Gamma, f64::NAN, |_| Ok(1.0)).is_err());
    }
}
