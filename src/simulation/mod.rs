//! Path simulation for the Monte Carlo engines.
//!
//! Every generator produces a [`SimulationPaths`] matrix of shape
//! `(time_steps, num_sims)`: column `j` is one simulated trajectory, row `i`
//! the price after step `i + 1`, so the last row holds terminal prices.
//!
//! Generators never draw random numbers themselves. They consume an explicit
//! [`DrawBuffer`] (see [`draws`]) so the same buffer can be replayed across the
//! bumped valuations of a finite-difference Greek.
//!
//! ## Generators
//!
//! - [`GbmSimulator`] — geometric Brownian motion, exact log step
//! - [`JumpDiffusionSimulator`] — Merton jump-diffusion
//! - [`HestonSimulator`] — Heston stochastic volatility, full-truncation Euler

pub mod draws;
pub mod gbm;
pub mod heston;
pub mod jump_diffusion;

pub use draws::{CorrelatedDraws, MonteCarloDraws};
pub use gbm::GbmSimulator;
pub use heston::{HestonParams, HestonSimulator};
pub use jump_diffusion::{JumpDiffusionSimulator, JumpParams};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{self, PricingError};

/// Simulated trajectories, shape `(time_steps, num_sims)`.
pub type SimulationPaths = DMatrix<f64>;

/// A block of random draws, shape `(time_steps, num_sims)`.
///
/// Engines only ever borrow a buffer immutably, so a caller-owned buffer is
/// guaranteed identical across every valuation that reads it.
pub type DrawBuffer = DMatrix<f64>;

/// Sizing and seeding shared by the simulation engines.
///
/// With `seed = None` every internally generated buffer comes from OS
/// entropy; with `Some(seed)` repeated calls regenerate the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SimulationConfigRaw", into = "SimulationConfigRaw")]
pub struct SimulationConfig {
    num_sims: usize,
    seed: Option<u64>,
}

#[derive(Serialize, Deserialize)]
struct SimulationConfigRaw {
    num_sims: usize,
    #[serde(default)]
    seed: Option<u64>,
}

impl TryFrom<SimulationConfigRaw> for SimulationConfig {
    type Error = PricingError;
    fn try_from(raw: SimulationConfigRaw) -> Result<Self, Self::Error> {
        let config = Self::new(raw.num_sims)?;
        Ok(match raw.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

impl From<SimulationConfig> for SimulationConfigRaw {
    fn from(c: SimulationConfig) -> Self {
        Self {
            num_sims: c.num_sims,
            seed: c.seed,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_sims: 1000,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Unseeded configuration with `num_sims` paths per valuation.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `num_sims` is zero.
    pub fn new(num_sims: usize) -> error::Result<Self> {
        if num_sims == 0 {
            return Err(PricingError::InvalidArgument {
                message: "num_sims must be at least 1".to_string(),
            });
        }
        Ok(Self {
            num_sims,
            seed: None,
        })
    }

    /// Fix the seed used whenever an engine generates its own buffer.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn num_sims(&self) -> usize {
        self.num_sims
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
