//! Merton jump-diffusion paths.
//!
//! GBM plus a compound Poisson process of lognormal jumps:
//!
//! ```text
//! ln S_{t+dt} − ln S_t = (μ − σ²/2 − λκ)·dt + σ·√dt·z + J
//! κ = e^(μ_j + σ_j²/2) − 1
//! ```
//!
//! `J` is the per-step jump component supplied by the caller (see
//! [`jump_components`](super::draws::jump_components)). The `−λκ` drift
//! compensator keeps `E[S_T] = S₀·e^(μT)`, so the process stays a martingale
//! after discounting at `μ = r`.
//!
//! # References
//! - Merton, R. "Option pricing when underlying stock returns are discontinuous" (1976)

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use super::{DrawBuffer, SimulationPaths};
use crate::error::{self, PricingError};
use crate::validate::{validate_finite, validate_non_negative, validate_positive, validate_shape};

/// Jump intensity and lognormal jump-size distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JumpParamsRaw", into = "JumpParamsRaw")]
pub struct JumpParams {
    /// Expected jumps per year λ ≥ 0.
    intensity: f64,
    /// Mean log jump size μ_j.
    mean: f64,
    /// Log jump size volatility σ_j ≥ 0.
    volatility: f64,
}

#[derive(Serialize, Deserialize)]
struct JumpParamsRaw {
    intensity: f64,
    mean: f64,
    volatility: f64,
}

impl TryFrom<JumpParamsRaw> for JumpParams {
    type Error = PricingError;
    fn try_from(raw: JumpParamsRaw) -> Result<Self, Self::Error> {
        Self::new(raw.intensity, raw.mean, raw.volatility)
    }
}

impl From<JumpParams> for JumpParamsRaw {
    fn from(p: JumpParams) -> Self {
        Self {
            intensity: p.intensity,
            mean: p.mean,
            volatility: p.volatility,
        }
    }
}

/// λ = 0.1, μ_j = −0.2, σ_j = 0.3: rare, mostly downward jumps.
impl Default for JumpParams {
    fn default() -> Self {
        Self {
            intensity: 0.1,
            mean: -0.2,
            volatility: 0.3,
        }
    }
}

impl JumpParams {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `intensity` or
    /// `volatility` is negative, or any parameter is non-finite.
    pub fn new(intensity: f64, mean: f64, volatility: f64) -> error::Result<Self> {
        validate_non_negative(intensity, "jump intensity")?;
        validate_finite(mean, "jump mean")?;
        validate_non_negative(volatility, "jump volatility")?;
        Ok(Self {
            intensity,
            mean,
            volatility,
        })
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Expected relative jump size κ = E\[e^J\] − 1.
    pub fn compensator(&self) -> f64 {
        (self.mean + 0.5 * self.volatility * self.volatility).exp() - 1.0
    }
}

/// Merton jump-diffusion path generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpDiffusionSimulator {
    s0: f64,
    mu: f64,
    sigma: f64,
    jumps: JumpParams,
    expiry: f64,
}

impl JumpDiffusionSimulator {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] for a non-positive `s0` or
    /// `expiry`, a negative `sigma`, or a non-finite drift.
    pub fn new(
        s0: f64,
        mu: f64,
        sigma: f64,
        jumps: JumpParams,
        expiry: f64,
    ) -> error::Result<Self> {
        validate_positive(s0, "s0")?;
        validate_finite(mu, "mu")?;
        validate_non_negative(sigma, "sigma")?;
        validate_positive(expiry, "expiry")?;
        Ok(Self {
            s0,
            mu,
            sigma,
            jumps,
            expiry,
        })
    }

    /// Simulate `num_sims` paths of `n_steps` steps.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if either buffer is not
    /// exactly `(n_steps, num_sims)`.
    pub fn simulate(
        &self,
        n_steps: usize,
        num_sims: usize,
        draws: &DrawBuffer,
        jump_draws: &DrawBuffer,
    ) -> error::Result<SimulationPaths> {
        validate_shape(draws.shape(), (n_steps, num_sims), "normal draws")?;
        validate_shape(jump_draws.shape(), (n_steps, num_sims), "jump draws")?;

        let dt = self.expiry / n_steps as f64;
        let drift = (self.mu
            - 0.5 * self.sigma * self.sigma
            - self.jumps.intensity * self.jumps.compensator())
            * dt;
        let diffusion = self.sigma * dt.sqrt();

        let mut paths = DMatrix::zeros(n_steps, num_sims);
        for ((mut path, z), jump) in paths
            .column_iter_mut()
            .zip(draws.column_iter())
            .zip(jump_draws.column_iter())
        {
            let mut s = self.s0;
            for i in 0..n_steps {
                s *= (diffusion.mul_add(z[i], drift) + jump[i]).exp();
                path[i] = s;
            }
        }
        Ok(paths)
    }
}
