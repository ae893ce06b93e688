//! Black-Scholes implied volatility via Newton-Raphson.
//!
//! Iterates `σₙ₊₁ = σₙ − (C(σₙ) − P) / vega(σₙ)` from the
//! Brenner-Subrahmanyam at-the-money guess `σ₀ = √(2π/T)·P/S`.
//!
//! Iterates are not bounded. For prices that admit no real positive
//! volatility the iteration may diverge (reported as
//! [`PricingError::NumericalFailure`]) or settle on a non-physical root, which
//! is returned as-is; callers must check the sign of the result.
//!
//! # References
//! - Brenner, M. & Subrahmanyam, M. "A Simple Formula to Compute the Implied
//!   Standard Deviation" (1988)

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::analytic::{bs_price, bs_vega};
use crate::error::{self, PricingError};
use crate::types::{OptionType, Vol};
use crate::validate::{validate_finite, validate_positive};

/// Newton-Raphson implied-volatility solver.
///
/// Converges when a Newton step is smaller than `tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ImpliedVolSolverRaw", into = "ImpliedVolSolverRaw")]
pub struct ImpliedVolSolver {
    tolerance: f64,
    max_iterations: usize,
}

#[derive(Serialize, Deserialize)]
struct ImpliedVolSolverRaw {
    tolerance: f64,
    max_iterations: usize,
}

impl TryFrom<ImpliedVolSolverRaw> for ImpliedVolSolver {
    type Error = PricingError;
    fn try_from(raw: ImpliedVolSolverRaw) -> Result<Self, Self::Error> {
        Self::new(raw.tolerance, raw.max_iterations)
    }
}

impl From<ImpliedVolSolver> for ImpliedVolSolverRaw {
    fn from(s: ImpliedVolSolver) -> Self {
        Self {
            tolerance: s.tolerance,
            max_iterations: s.max_iterations,
        }
    }
}

/// Step tolerance 1.48e-8, 50 iterations.
impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            tolerance: 1.48e-8,
            max_iterations: 50,
        }
    }
}

impl ImpliedVolSolver {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `tolerance` is not
    /// positive and finite or `max_iterations` is zero.
    pub fn new(tolerance: f64, max_iterations: usize) -> error::Result<Self> {
        validate_positive(tolerance, "tolerance")?;
        if max_iterations == 0 {
            return Err(PricingError::InvalidArgument {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        Ok(Self {
            tolerance,
            max_iterations,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Brenner-Subrahmanyam starting point `√(2π/T)·P/S`.
    pub fn initial_guess(spot: f64, expiry: f64, observed_price: f64) -> f64 {
        (2.0 * PI / expiry).sqrt() * observed_price / spot
    }

    /// Solve `BS(σ) = observed_price` for `σ`.
    ///
    /// # Errors
    /// - [`PricingError::InvalidArgument`] if `spot`, `strike`, `expiry` or
    ///   `observed_price` is not positive and finite, or `rate` is not finite.
    /// - [`PricingError::NumericalFailure`] if vega vanishes, an iterate
    ///   becomes non-finite, or the iteration budget runs out.
    ///
    /// # Examples
    /// ```
    /// use optpricing::implied::ImpliedVolSolver;
    /// use optpricing::OptionType;
    ///
    /// let solver = ImpliedVolSolver::default();
    /// let vol = solver.solve(100.0, 100.0, 0.05, 1.0, 10.4506, OptionType::Call)?;
    /// assert!((vol.0 - 0.20).abs() < 1e-4);
    /// # Ok::<(), optpricing::PricingError>(())
    /// ```
    pub fn solve(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        expiry: f64,
        observed_price: f64,
        option_type: OptionType,
    ) -> error::Result<Vol> {
        validate_positive(spot, "spot")?;
        validate_positive(strike, "strike")?;
        validate_finite(rate, "rate")?;
        validate_positive(expiry, "expiry")?;
        validate_positive(observed_price, "observed price")?;

        let mut sigma = Self::initial_guess(spot, expiry, observed_price);
        for iteration in 1..=self.max_iterations {
            let diff = bs_price(spot, strike, rate, sigma, expiry, option_type) - observed_price;
            let vega = bs_vega(spot, strike, rate, sigma, expiry);
            if vega == 0.0 || !vega.is_finite() {
                warn!(iteration, sigma, vega, "implied vol: vega vanished");
                return Err(PricingError::NumericalFailure {
                    message: format!("vega is {vega} at sigma = {sigma}"),
                    iterations: iteration,
                });
            }
            let step = diff / vega;
            sigma -= step;
            if !sigma.is_finite() {
                warn!(iteration, "implied vol: iterate diverged");
                return Err(PricingError::NumericalFailure {
                    message: "Newton iterate is not finite".to_string(),
                    iterations: iteration,
                });
            }
            if step.abs() < self.tolerance {
                debug!(iteration, sigma, "implied vol converged");
                return Ok(Vol(sigma));
            }
        }
        warn!(
            max_iterations = self.max_iterations,
            sigma, "implied vol did not converge"
        );
        Err(PricingError::NumericalFailure {
            message: format!(
                "implied vol did not converge to {} (last sigma = {sigma})",
                self.tolerance
            ),
            iterations: self.max_iterations,
        })
    }
}
