//! Monte Carlo pricing under Merton jump-diffusion or plain GBM.
//!
//! A valuation simulates `time_steps(T)` hourly steps per path under the
//! risk-neutral drift `μ = r`, applies the payoff to each path and discounts
//! the mean: `V = e^(−rT) · mean(payoff)`.
//!
//! Greeks are finite differences that replay one [`MonteCarloDraws`] buffer
//! for every bumped valuation (common random numbers):
//!
//! | Greek | Scheme  | Bump                |
//! |-------|---------|---------------------|
//! | delta | forward | `S += T / steps`    |
//! | gamma | central | `S ± T / steps`     |
//! | vega  | forward | `σ += 1 / steps`    |
//! | rho   | forward | `r += T / steps`    |
//!
//! Theta is not provided. Bumping `T` changes the step count, so the base
//! and bumped valuations cannot share one buffer shape, and truncating the
//! buffer makes both legs collapse to the same quantity.

use std::borrow::Cow;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::bump::{central_second_difference, forward_difference};
use super::{unsupported, PricingModel};
use crate::conventions::{discount_factor, time_steps};
use crate::error::{self, PricingError};
use crate::payoff::{EuropeanPayoff, PayoffEvaluator};
use crate::simulation::draws::{jump_components, seeded_rng, standard_normals, stream_seed};
use crate::simulation::{
    GbmSimulator, JumpDiffusionSimulator, JumpParams, MonteCarloDraws, SimulationConfig,
};
use crate::types::{Greek, GreekResult, OptionContract};
use crate::validate::validate_shape;

fn default_jumps() -> Option<JumpParams> {
    Some(JumpParams::default())
}

/// Monte Carlo engine settings.
///
/// `jumps = None` switches the engine to pure GBM paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default = "default_jumps")]
    pub jumps: Option<JumpParams>,
}

/// 1000 unseeded paths with the default jump model.
impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            jumps: default_jumps(),
        }
    }
}

impl MonteCarloConfig {
    /// Jump-diffusion with default jump parameters.
    pub fn new(simulation: SimulationConfig) -> Self {
        Self {
            simulation,
            jumps: default_jumps(),
        }
    }

    pub fn with_jumps(mut self, jumps: JumpParams) -> Self {
        self.jumps = Some(jumps);
        self
    }

    /// Simulate plain GBM paths.
    pub fn without_jumps(mut self) -> Self {
        self.jumps = None;
        self
    }
}

/// Monte Carlo pricing engine.
///
/// The payoff defaults to the contract's own European payoff; a custom
/// [`PayoffEvaluator`] can be attached with [`with_payoff`](Self::with_payoff).
///
/// # Examples
/// ```
/// use optpricing::{MonteCarloConfig, MonteCarloEngine, OptionContract, OptionType, PricingModel};
/// use optpricing::simulation::SimulationConfig;
///
/// let config = MonteCarloConfig::new(SimulationConfig::new(2_000)?.with_seed(7)).without_jumps();
/// let engine = MonteCarloEngine::new(config);
/// let call = OptionContract::new(100.0, 95.0, 0.05, 0.2, 0.05, OptionType::Call)?;
///
/// // one buffer shared by several calls keeps them comparable
/// let draws = engine.generate_draws(&call)?;
/// let price = engine.price(&call, Some(&draws))?;
/// let delta = engine.delta(&call, Some(&draws))?;
/// assert!(price > 0.0 && delta.value > 0.0);
/// # Ok::<(), optpricing::PricingError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MonteCarloEngine {
    config: MonteCarloConfig,
    payoff: Option<Arc<dyn PayoffEvaluator>>,
}

impl MonteCarloEngine {
    pub fn new(config: MonteCarloConfig) -> Self {
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

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Price with `num_sims` split into `batches` independent sub-batches.
    ///
    /// Batch `i` draws from its own stream seeded from the configured seed
    /// (or a random base seed) and index `i`; the batch prices are combined
    /// weighted by path count. With the `parallel` feature the batches run on
    /// the rayon pool, otherwise sequentially, with identical results.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `batches` is zero and
    /// [`PricingError::DegenerateInput`] if the expiry yields no time steps.
    pub fn price_batched(&self, contract: &OptionContract, batches: usize) -> error::Result<f64> {
        if batches == 0 {
            return Err(PricingError::InvalidArgument {
                message: "batches must be at least 1".to_string(),
            });
        }
        let total = self.config.simulation.num_sims();
        let batches = batches.min(total);
        let steps = time_steps(contract.expiry())?;
        let base_seed = self
            .config
            .simulation
            .seed()
            .unwrap_or_else(rand::random::<u64>);
        let sizes: Vec<usize> = (0..batches)
            .map(|i| total / batches + usize::from(i < total % batches))
            .collect();
        debug!(batches, total, steps, "batched monte carlo valuation");

        let run = |(i, &num_sims): (usize, &usize)| -> error::Result<(f64, usize)> {
            let mut rng = seeded_rng(Some(stream_seed(base_seed, i)));
            let draws = self.generate(&mut rng, steps, num_sims, contract.expiry())?;
            Ok((self.value(contract, &draws, num_sims)?, num_sims))
        };

        #[cfg(feature = "parallel")]
        let results = {
            use rayon::prelude::*;
            sizes
                .par_iter()
                .enumerate()
                .map(run)
                .collect::<error::Result<Vec<_>>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let results = sizes
            .iter()
            .enumerate()
            .map(run)
            .collect::<error::Result<Vec<_>>>()?;

        let weighted: f64 = results.iter().map(|&(p, n)| p * n as f64).sum();
        Ok(weighted / total as f64)
    }

    fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        steps: usize,
        num_sims: usize,
        expiry: f64,
    ) -> error::Result<MonteCarloDraws> {
        let draws = MonteCarloDraws::new(standard_normals(rng, steps, num_sims));
        match &self.config.jumps {
            Some(params) => {
                let jumps = jump_components(rng, steps, num_sims, expiry / steps as f64, params)?;
                Ok(draws.with_jumps(jumps))
            }
            None => Ok(draws),
        }
    }

    /// The caller's buffer, or a freshly generated one.
    ///
    /// A supplied buffer must already carry jump draws when the jump model is
    /// enabled; the engine never completes it from its own generator.
    fn resolve<'a>(
        &self,
        contract: &OptionContract,
        draws: Option<&'a MonteCarloDraws>,
    ) -> error::Result<Cow<'a, MonteCarloDraws>> {
        match draws {
            None => Ok(Cow::Owned(self.generate_draws(contract)?)),
            Some(d) if self.config.jumps.is_some() && d.jumps.is_none() => {
                Err(PricingError::InvalidArgument {
                    message: "malformed draw buffer: jump draws are required when the jump model \
                              is enabled"
                        .to_string(),
                })
            }
            Some(d) => Ok(Cow::Borrowed(d)),
        }
    }

    /// One discounted-mean valuation against a complete buffer.
    fn value(
        &self,
        contract: &OptionContract,
        draws: &MonteCarloDraws,
        num_sims: usize,
    ) -> error::Result<f64> {
        let steps = time_steps(contract.expiry())?;
        validate_shape(draws.shape(), (steps, num_sims), "normal draws")?;
        trace!(
            steps,
            num_sims,
            jumps = self.config.jumps.is_some(),
            "monte carlo valuation"
        );

        let paths = match &self.config.jumps {
            Some(params) => {
                let jumps = draws.jumps.as_ref().ok_or_else(|| PricingError::InvalidArgument {
                    message: "jump draws are required when the jump model is enabled".to_string(),
                })?;
                JumpDiffusionSimulator::new(
                    contract.spot(),
                    contract.rate(),
                    contract.sigma(),
                    *params,
                    contract.expiry(),
                )?
                .simulate(steps, num_sims, &draws.normals, jumps)?
            }
            None => GbmSimulator::new(
                contract.spot(),
                contract.rate(),
                contract.sigma(),
                contract.expiry(),
            )?
            .simulate(steps, num_sims, &draws.normals)?,
        };

        let payoffs = match &self.payoff {
            Some(payoff) => payoff.evaluate(&paths),
            None => EuropeanPayoff::from(contract).evaluate(&paths),
        };
        Ok(discount_factor(contract.rate(), contract.expiry()) * payoffs.mean())
    }

    fn spot_step(contract: &OptionContract) -> error::Result<f64> {
        Ok(contract.expiry() / time_steps(contract.expiry())? as f64)
    }
}

impl PricingModel for MonteCarloEngine {
    type Draws = MonteCarloDraws;

    fn name(&self) -> &'static str {
        if self.config.jumps.is_some() {
            "Merton jump-diffusion"
        } else {
            "GBM Monte Carlo"
        }
    }

    fn generate_draws(&self, contract: &OptionContract) -> error::Result<MonteCarloDraws> {
        let steps = time_steps(contract.expiry())?;
        let mut rng = seeded_rng(self.config.simulation.seed());
        self.generate(
            &mut rng,
            steps,
            self.config.simulation.num_sims(),
            contract.expiry(),
        )
    }

    fn price(
        &self,
        contract: &OptionContract,
        draws: Option<&MonteCarloDraws>,
    ) -> error::Result<f64> {
        let draws = self.resolve(contract, draws)?;
        self.value(contract, &draws, self.config.simulation.num_sims())
    }

    fn delta(
        &self,
        contract: &OptionContract,
        draws: Option<&MonteCarloDraws>,
    ) -> error::Result<GreekResult> {
        let step = Self::spot_step(contract)?;
        let draws = self.resolve(contract, draws)?;
        let n = self.config.simulation.num_sims();
        forward_difference(Greek::Delta, step, |dx| {
            self.value(&contract.with_spot(contract.spot() + dx)?, &draws, n)
        })
    }

    /// Central difference in `S` with step `h = T / time_steps(T)`.
    ///
    /// # Errors
    /// Returns [`PricingError::DegenerateInput`] when `S ≤ h`, since the
    /// down-bumped spot would not be a valid contract.
    fn gamma(
        &self,
        contract: &OptionContract,
        draws: Option<&MonteCarloDraws>,
    ) -> error::Result<GreekResult> {
        let step = Self::spot_step(contract)?;
        if contract.spot() <= step {
            return Err(PricingError::DegenerateInput {
                message: format!(
                    "spot {} does not exceed the gamma bump {step}; the down leg would be \
                     non-positive",
                    contract.spot()
                ),
            });
        }
        let draws = self.resolve(contract, draws)?;
        let n = self.config.simulation.num_sims();
        central_second_difference(Greek::Gamma, step, |dx| {
            self.value(&contract.with_spot(contract.spot() + dx)?, &draws, n)
        })
    }

    fn vega(
        &self,
        contract: &OptionContract,
        draws: Option<&MonteCarloDraws>,
    ) -> error::Result<GreekResult> {
        let step = 1.0 / time_steps(contract.expiry())? as f64;
        let draws = self.resolve(contract, draws)?;
        let n = self.config.simulation.num_sims();
        forward_difference(Greek::Vega, step, |dx| {
            self.value(&contract.with_sigma(contract.sigma() + dx)?, &draws, n)
        })
    }

    fn theta(
        &self,
        _contract: &OptionContract,
        _draws: Option<&MonteCarloDraws>,
    ) -> error::Result<GreekResult> {
        Err(unsupported(Greek::Theta, self.name()))
    }

    fn rho(
        &self,
        contract: &OptionContract,
        draws: Option<&MonteCarloDraws>,
    ) -> error::Result<GreekResult> {
        let step = Self::spot_step(contract)?;
        let draws = self.resolve(contract, draws)?;
        let n = self.config.simulation.num_sims();
        forward_difference(Greek::Rho, step, |dx| {
            self.value(&contract.with_rate(contract.rate() + dx)?, &draws, n)
        })
    }
}
