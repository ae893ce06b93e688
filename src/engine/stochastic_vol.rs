//! Monte Carlo pricing under Heston stochastic volatility.
//!
//! Paths come from [`HestonSimulator`] driven by correlated price/variance
//! shocks; the contract's `sigma` sets the initial variance `v₀ = σ²`.
//! Only delta is provided, as a forward difference in `S` with step
//! `T / time_steps(T)` over one shared [`CorrelatedDraws`] buffer.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::bump::forward_difference;
use super::PricingModel;
use crate::conventions::{discount_factor, time_steps};
use crate::error;
use crate::payoff::{EuropeanPayoff, PayoffEvaluator};
use crate::simulation::draws::{correlated_normals, seeded_rng};
use crate::simulation::{CorrelatedDraws, HestonParams, HestonSimulator, SimulationConfig};
use crate::types::{Greek, GreekResult, OptionContract};
use crate::validate::validate_shape;

/// Heston engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticVolatilityConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub heston: HestonParams,
}

impl StochasticVolatilityConfig {
    pub fn new(simulation: SimulationConfig, heston: HestonParams) -> Self {
        Self { simulation, heston }
    }
}

/// Heston Monte Carlo engine.
///
/// # Examples
/// ```
/// use optpricing::simulation::{HestonParams, SimulationConfig};
/// use optpricing::{
///     OptionContract, OptionType, PricingModel, StochasticVolatilityConfig,
///     StochasticVolatilityEngine,
/// };
///
/// let heston = HestonParams::new(-0.7, 0.3, 2.0, 0.04)?;
/// let engine = StochasticVolatilityEngine::new(StochasticVolatilityConfig::new(
///     SimulationConfig::new(1_000)?.with_seed(1),
///     heston,
/// ));
/// let put = OptionContract::new(100.0, 100.0, 0.03, 0.2, 0.05, OptionType::Put)?;
/// assert!(engine.price(&put, None)? > 0.0);
/// assert!(engine.vega(&put, None).is_err());
/// # Ok::<(), optpricing::PricingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StochasticVolatilityEngine {
    config: StochasticVolatilityConfig,
    payoff: Option<Arc<dyn PayoffEvaluator>>,
}

impl StochasticVolatilityEngine {
    pub fn new(config: StochasticVolatilityConfig) -> Self {
        Self {
            config,
            payoff: None,
        }
    }

    /// Price a custom payoff instead of the contract's European payoff.
    pub fn with_payoff(mut self, payoff: Arc<dyn PayoffEvaluator>) -> Self {
        self.payoff = Some(payoff);
        self
    }

    pub fn config(&self) -> &StochasticVolatilityConfig {
        &self.config
    }

    fn value(&self, contract: &OptionContract, draws: &CorrelatedDraws) -> error::Result<f64> {
        let steps = time_steps(contract.expiry())?;
        let num_sims = self.config.simulation.num_sims();
        validate_shape(draws.shape(), (steps, num_sims), "correlated draws")?;
        trace!(steps, num_sims, "heston valuation");

        let paths = HestonSimulator::new(
            contract.spot(),
            contract.rate(),
            contract.sigma(),
            self.config.heston,
            contract.expiry(),
        )?
        .simulate(steps, num_sims, draws)?;

        let payoffs = match &self.payoff {
            Some(payoff) => payoff.evaluate(&paths),
            None => EuropeanPayoff::from(contract).evaluate(&paths),
        };
        Ok(discount_factor(contract.rate(), contract.expiry()) * payoffs.mean())
    }

    fn resolve<'a>(
        &self,
        contract: &OptionContract,
        draws: Option<&'a CorrelatedDraws>,
    ) -> error::Result<Cow<'a, CorrelatedDraws>> {
        match draws {
            Some(d) => Ok(Cow::Borrowed(d)),
            None => Ok(Cow::Owned(self.generate_draws(contract)?)),
        }
    }
}

impl PricingModel for StochasticVolatilityEngine {
    type Draws = CorrelatedDraws;

    fn name(&self) -> &'static str {
        "Heston"
    }

    fn generate_draws(&self, contract: &OptionContract) -> error::Result<CorrelatedDraws> {
        let steps = time_steps(contract.expiry())?;
        let mut rng = seeded_rng(self.config.simulation.seed());
        correlated_normals(
            &mut rng,
            steps,
            self.config.simulation.num_sims(),
            self.config.heston.corr(),
        )
    }

    fn price(
        &self,
        contract: &OptionContract,
        draws: Option<&CorrelatedDraws>,
    ) -> error::Result<f64> {
        let draws = self.resolve(contract, draws)?;
        self.value(contract, &draws)
    }

    fn delta(
        &self,
        contract: &OptionContract,
        draws: Option<&CorrelatedDraws>,
    ) -> error::Result<GreekResult> {
        let step = contract.expiry() / time_steps(contract.expiry())? as f64;
        let draws = self.resolve(contract, draws)?;
        forward_difference(Greek::Delta, step, |dx| {
            self.value(&contract.with_spot(contract.spot() + dx)?, &draws)
        })
    }
}
