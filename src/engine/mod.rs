//! Pricing engines.
//!
//! Every engine implements [`PricingModel`]: a price plus the five
//! first/second-order sensitivities, each computed for one
//! [`OptionContract`]. Engines are stateless between calls; the only thing a
//! caller may thread through repeated calls is a random-draw buffer.
//!
//! ## Engines
//!
//! - [`AnalyticEngine`] — closed-form Black-Scholes, analytic Greeks, implied vol
//! - [`MonteCarloEngine`] — Merton jump-diffusion (or plain GBM), finite-difference Greeks
//! - [`StochasticVolatilityEngine`] — Heston, finite-difference delta

pub mod analytic;
pub(crate) mod bump;
pub mod monte_carlo;
pub mod stochastic_vol;

pub use analytic::AnalyticEngine;
pub use monte_carlo::{MonteCarloConfig, MonteCarloEngine};
pub use stochastic_vol::{StochasticVolatilityConfig, StochasticVolatilityEngine};

use crate::error::{self, PricingError};
use crate::types::{Greek, GreekResult, Greeks, OptionContract};

/// A model that prices European options and their sensitivities.
///
/// `Draws` is the random input the model consumes: `()` for closed-form
/// models, a draw buffer for simulation models. Passing `Some(draws)` makes a
/// call a pure function of its arguments; passing `None` lets the engine
/// generate a buffer itself (seeded from its configuration).
///
/// Greeks a model does not provide return [`PricingError::Unsupported`]
/// rather than an approximation.
///
/// # Thread Safety
/// All implementations must be `Send + Sync` so one engine can serve
/// concurrent pricing threads.
pub trait PricingModel: Send + Sync {
    /// Random input consumed by one valuation.
    type Draws: Send + Sync;

    /// Short model name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Generate the draws one valuation of `contract` consumes.
    fn generate_draws(&self, contract: &OptionContract) -> error::Result<Self::Draws>;

    /// Present value of `contract`.
    fn price(&self, contract: &OptionContract, draws: Option<&Self::Draws>) -> error::Result<f64>;

    /// ∂V/∂S.
    fn delta(
        &self,
        contract: &OptionContract,
        draws: Option<&Self::Draws>,
    ) -> error::Result<GreekResult>;

    /// ∂²V/∂S².
    fn gamma(
        &self,
        contract: &OptionContract,
        draws: Option<&Self::Draws>,
    ) -> error::Result<GreekResult> {
        let _ = (contract, draws);
        Err(unsupported(Greek::Gamma, self.name()))
    }

    /// ∂V/∂σ.
    fn vega(
        &self,
        contract: &OptionContract,
        draws: Option<&Self::Draws>,
    ) -> error::Result<GreekResult> {
        let _ = (contract, draws);
        Err(unsupported(Greek::Vega, self.name()))
    }

    /// ∂V/∂T.
    fn theta(
        &self,
        contract: &OptionContract,
        draws: Option<&Self::Draws>,
    ) -> error::Result<GreekResult> {
        let _ = (contract, draws);
        Err(unsupported(Greek::Theta, self.name()))
    }

    /// ∂V/∂r.
    fn rho(
        &self,
        contract: &OptionContract,
        draws: Option<&Self::Draws>,
    ) -> error::Result<GreekResult> {
        let _ = (contract, draws);
        Err(unsupported(Greek::Rho, self.name()))
    }

    /// Every supported Greek, all computed from one draw buffer.
    ///
    /// Unsupported Greeks come back as `None`; any other error aborts the
    /// whole call.
    fn greeks(
        &self,
        contract: &OptionContract,
        draws: Option<&Self::Draws>,
    ) -> error::Result<Greeks> {
        let generated;
        let draws = match draws {
            Some(draws) => draws,
            None => {
                generated = self.generate_draws(contract)?;
                &generated
            }
        };
        Ok(Greeks {
            delta: supported(self.delta(contract, Some(draws)))?,
            gamma: supported(self.gamma(contract, Some(draws)))?,
            vega: supported(self.vega(contract, Some(draws)))?,
            theta: supported(self.theta(contract, Some(draws)))?,
            rho: supported(self.rho(contract, Some(draws)))?,
        })
    }
}

pub(crate) fn unsupported(greek: Greek, model: &'static str) -> PricingError {
    PricingError::Unsupported { greek, model }
}

fn supported(result: error::Result<GreekResult>) -> error::Result<Option<GreekResult>> {
    match result {
        Ok(greek) => Ok(Some(greek)),
        Err(PricingError::Unsupported { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionType;

    /// Linear in spot, supports delta only.
    struct Linear;

    impl PricingModel for Linear {
        type Draws = f64;

        fn name(&self) -> &'static str {
            "linear"
        }

        fn generate_draws(&self, _contract: &OptionContract) -> error::Result<f64> {
            Ok(2.0)
        }

        fn price(&self, contract: &OptionContract, draws: Option<&f64>) -> error::Result<f64> {
            Ok(contract.spot() * draws.copied().unwrap_or(1.0))
        }

        fn delta(&self, _contract: &OptionContract, draws: Option<&f64>) -> error::Result<GreekResult> {
            Ok(GreekResult::analytic(Greek::Delta, draws.copied().unwrap_or(1.0)))
        }
    }

    fn contract() -> OptionContract {
        OptionContract::new(100.0, 100.0, 0.0, 0.2, 1.0, OptionType::Call).unwrap()
    }

    #[test]
    fn default_greeks_are_unsupported() {
        let err = Linear.vega(&contract(), None).unwrap_err();
        assert!(matches!(
            err,
            PricingError::Unsupported {
                greek: Greek::Vega,
                model: "linear"
            }
        ));
    }

    #[test]
    fn greeks_generates_draws_once_and_skips_unsupported() {
        let g = Linear.greeks(&contract(), None).unwrap();
        assert_eq!(g.delta.map(|d| d.value), Some(2.0));
        assert!(g.gamma.is_none());
        assert!(g.vega.is_none());
        assert!(g.theta.is_none());
        assert!(g.rho.is_none());
    }

    #[test]
    fn greeks_uses_supplied_draws() {
        let g = Linear.greeks(&contract(), Some(&3.0)).unwrap();
        assert_eq!(g.delta.map(|d| d.value), Some(3.0));
    }
}
