//! Closed-form Black-Scholes pricing and Greeks.
//!
//! ```text
//! d₁ = [ln(S/K) + (r + σ²/2)·T] / (σ√T)
//! d₂ = d₁ − σ√T
//! C  = S·Φ(d₁) − K·e^(−rT)·Φ(d₂)
//! P  = K·e^(−rT)·Φ(−d₂) − S·Φ(−d₁)
//! ```
//!
//! At `σ = 0` the deterministic limit is used: `d₁ = d₂ = ±∞` depending on
//! whether the forward is above or below the strike (0 exactly at the
//! forward), so prices collapse to discounted intrinsic value and gamma to 0.

use serde::{Deserialize, Serialize};

use super::PricingModel;
use crate::conventions::{discount_factor, forward_price};
use crate::error;
use crate::implied::ImpliedVolSolver;
use crate::math::{norm_cdf, norm_pdf};
use crate::types::{Greek, GreekResult, OptionContract, OptionType, Vol};
use crate::validate::validate_d_index;

/// `(d₁, d₂)` without input validation.
///
/// A negative `sigma` is evaluated through the formula as written, which the
/// implied-vol solver relies on when an iterate crosses zero.
pub(crate) fn d_pair(spot: f64, strike: f64, rate: f64, sigma: f64, expiry: f64) -> (f64, f64) {
    let vol_sqrt_t = sigma * expiry.sqrt();
    let log_forward_moneyness = (forward_price(spot, rate, expiry) / strike).ln();
    if vol_sqrt_t == 0.0 {
        let d = if log_forward_moneyness > 0.0 {
            f64::INFINITY
        } else if log_forward_moneyness < 0.0 {
            f64::NEG_INFINITY
        } else {
            0.0
        };
        return (d, d);
    }
    let d1 = (log_forward_moneyness + 0.5 * sigma * sigma * expiry) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Black-Scholes price without input validation.
pub(crate) fn bs_price(
    spot: f64,
    strike: f64,
    rate: f64,
    sigma: f64,
    expiry: f64,
    option_type: OptionType,
) -> f64 {
    let (d1, d2) = d_pair(spot, strike, rate, sigma, expiry);
    let df = discount_factor(rate, expiry);
    let w = option_type.sign();
    w * (spot * norm_cdf(w * d1) - strike * df * norm_cdf(w * d2))
}

/// Black-Scholes vega `S·φ(d₁)·√T` without input validation.
pub(crate) fn bs_vega(spot: f64, strike: f64, rate: f64, sigma: f64, expiry: f64) -> f64 {
    let (d1, _) = d_pair(spot, strike, rate, sigma, expiry);
    spot * norm_pdf(d1) * expiry.sqrt()
}

/// Closed-form Black-Scholes engine.
///
/// Carries only the implied-volatility solver settings; every pricing call
/// is a pure function of the contract.
///
/// # Examples
/// ```
/// use optpricing::{AnalyticEngine, OptionContract, OptionType, PricingModel};
///
/// let engine = AnalyticEngine::new();
/// let call = OptionContract::new(100.0, 90.0, 0.05, 0.2, 1.0, OptionType::Call)?;
/// let price = engine.price(&call, None)?;
/// assert!((price - 16.70).abs() < 0.01);
/// # Ok::<(), optpricing::PricingError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticEngine {
    #[serde(default)]
    solver: ImpliedVolSolver,
}

impl AnalyticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different implied-volatility budget.
    pub fn with_solver(mut self, solver: ImpliedVolSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn solver(&self) -> &ImpliedVolSolver {
        &self.solver
    }

    /// The Black-Scholes auxiliary term `d_i` for `i ∈ {1, 2}`.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`](crate::PricingError::InvalidArgument)
    /// if `i` is neither 1 nor 2.
    pub fn d_i(&self, contract: &OptionContract, i: u8) -> error::Result<f64> {
        let i = validate_d_index(i)?;
        let (d1, d2) = Self::d(contract);
        Ok(if i == 1 { d1 } else { d2 })
    }

    /// Volatility that reproduces `observed_price`.
    ///
    /// Delegates to the configured [`ImpliedVolSolver`]. The result is not
    /// clamped and may be non-physical for inconsistent prices.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`](crate::PricingError::InvalidArgument)
    /// for invalid market inputs and
    /// [`PricingError::NumericalFailure`](crate::PricingError::NumericalFailure)
    /// if the solver does not converge.
    pub fn implied_volatility(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        expiry: f64,
        observed_price: f64,
        option_type: OptionType,
    ) -> error::Result<Vol> {
        self.solver
            .solve(spot, strike, rate, expiry, observed_price, option_type)
    }

    fn d(contract: &OptionContract) -> (f64, f64) {
        d_pair(
            contract.spot(),
            contract.strike(),
            contract.rate(),
            contract.sigma(),
            contract.expiry(),
        )
    }
}

impl PricingModel for AnalyticEngine {
    type Draws = ();

    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn generate_draws(&self, _contract: &OptionContract) -> error::Result<()> {
        Ok(())
    }

    fn price(&self, contract: &OptionContract, _draws: Option<&()>) -> error::Result<f64> {
        Ok(bs_price(
            contract.spot(),
            contract.strike(),
            contract.rate(),
            contract.sigma(),
            contract.expiry(),
            contract.option_type(),
        ))
    }

    fn delta(&self, contract: &OptionContract, _draws: Option<&()>) -> error::Result<GreekResult> {
        let (d1, _) = Self::d(contract);
        let value = match contract.option_type() {
            OptionType::Call => norm_cdf(d1),
            OptionType::Put => norm_cdf(d1) - 1.0,
        };
        Ok(GreekResult::analytic(Greek::Delta, value))
    }

    fn gamma(&self, contract: &OptionContract, _draws: Option<&()>) -> error::Result<GreekResult> {
        let (d1, _) = Self::d(contract);
        let vol_sqrt_t = contract.sigma() * contract.expiry().sqrt();
        let value = if vol_sqrt_t == 0.0 {
            0.0
        } else {
            norm_pdf(d1) / (contract.spot() * vol_sqrt_t)
        };
        Ok(GreekResult::analytic(Greek::Gamma, value))
    }

    fn vega(&self, contract: &OptionContract, _draws: Option<&()>) -> error::Result<GreekResult> {
        let (d1, _) = Self::d(contract);
        let value = contract.spot() * norm_pdf(d1) * contract.expiry().sqrt();
        Ok(GreekResult::analytic(Greek::Vega, value))
    }

    fn theta(&self, contract: &OptionContract, _draws: Option<&()>) -> error::Result<GreekResult> {
        let (d1, d2) = Self::d(contract);
        let w = contract.option_type().sign();
        let df = discount_factor(contract.rate(), contract.expiry());
        let decay = -contract.spot() * norm_pdf(d1) * contract.sigma()
            / (2.0 * contract.expiry().sqrt());
        let carry = w * contract.rate() * contract.strike() * df * norm_cdf(w * d2);
        Ok(GreekResult::analytic(Greek::Theta, decay - carry))
    }

    fn rho(&self, contract: &OptionContract, _draws: Option<&()>) -> error::Result<GreekResult> {
        let (_, d2) = Self::d(contract);
        let w = contract.option_type().sign();
        let df = discount_factor(contract.rate(), contract.expiry());
        let value = w * contract.strike() * contract.expiry() * df * norm_cdf(w * d2);
        Ok(GreekResult::analytic(Greek::Rho, value))
    }
}
