//! Heston stochastic volatility paths.
//!
//! ```text
//! dS = μ·S·dt + √v·S·dW₁
//! dv = κ(θ − v)·dt + ε·√v·dW₂
//! dW₁·dW₂ = ρ dt
//! ```
//!
//! Discretized with full-truncation Euler: the variance may go negative
//! between steps but only `v⁺ = max(v, 0)` enters drift and diffusion. The
//! price uses a log step, so paths stay positive. The variance paths are
//! internal to the generator; only prices are returned.
//!
//! # References
//! - Heston, S. "A Closed-Form Solution for Options with Stochastic Volatility" (1993)
//! - Lord, R., Koekkoek, R. & van Dijk, D. "A comparison of biased simulation
//!   schemes for stochastic volatility models" (2010)

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use super::draws::CorrelatedDraws;
use super::SimulationPaths;
use crate::error::{self, PricingError};
use crate::validate::{
    validate_correlation, validate_finite, validate_non_negative, validate_positive,
    validate_shape,
};

/// Heston variance-process parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HestonParamsRaw", into = "HestonParamsRaw")]
pub struct HestonParams {
    /// Price/variance shock correlation ρ ∈ \[−1, 1\].
    corr: f64,
    /// Vol-of-vol ε ≥ 0 (ε = 0 makes the variance deterministic).
    epsilon: f64,
    /// Mean-reversion speed κ ≥ 0.
    kappa: f64,
    /// Long-run variance θ ≥ 0.
    theta: f64,
}

#[derive(Serialize, Deserialize)]
struct HestonParamsRaw {
    corr: f64,
    epsilon: f64,
    kappa: f64,
    theta: f64,
}

impl TryFrom<HestonParamsRaw> for HestonParams {
    type Error = PricingError;
    fn try_from(raw: HestonParamsRaw) -> Result<Self, Self::Error> {
        Self::new(raw.corr, raw.epsilon, raw.kappa, raw.theta)
    }
}

impl From<HestonParams> for HestonParamsRaw {
    fn from(p: HestonParams) -> Self {
        Self {
            corr: p.corr,
            epsilon: p.epsilon,
            kappa: p.kappa,
            theta: p.theta,
        }
    }
}

impl HestonParams {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `corr ∉ [−1, 1]` or any
    /// of `epsilon`, `kappa`, `theta` is negative or non-finite.
    pub fn new(corr: f64, epsilon: f64, kappa: f64, theta: f64) -> error::Result<Self> {
        validate_correlation(corr, "corr")?;
        validate_non_negative(epsilon, "epsilon")?;
        validate_non_negative(kappa, "kappa")?;
        validate_non_negative(theta, "theta")?;
        Ok(Self {
            corr,
            epsilon,
            kappa,
            theta,
        })
    }

    pub fn corr(&self) -> f64 {
        self.corr
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Whether `2κθ ≥ ε²`, i.e. the continuous variance process never hits zero.
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.epsilon * self.epsilon
    }
}

/// Heston path generator. The initial variance is `sigma²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonSimulator {
    s0: f64,
    mu: f64,
    sigma: f64,
    params: HestonParams,
    expiry: f64,
}

impl HestonSimulator {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] for a non-positive `s0` or
    /// `expiry`, a negative initial vol `sigma`, or a non-finite drift.
    pub fn new(
        s0: f64,
        mu: f64,
        sigma: f64,
        params: HestonParams,
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
            params,
            expiry,
        })
    }

    /// Simulate `num_sims` price paths of `n_steps` steps.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if either marginal of `draws`
    /// is not exactly `(n_steps, num_sims)`.
    pub fn simulate(
        &self,
        n_steps: usize,
        num_sims: usize,
        draws: &CorrelatedDraws,
    ) -> error::Result<SimulationPaths> {
        validate_shape(draws.price.shape(), (n_steps, num_sims), "price draws")?;
        validate_shape(draws.variance.shape(), (n_steps, num_sims), "variance draws")?;

        let dt = self.expiry / n_steps as f64;
        let HestonParams {
            epsilon,
            kappa,
            theta,
            ..
        } = self.params;

        let mut paths = DMatrix::zeros(n_steps, num_sims);
        for ((mut path, zs), zv) in paths
            .column_iter_mut()
            .zip(draws.price.column_iter())
            .zip(draws.variance.column_iter())
        {
            let mut s = self.s0;
            let mut v = self.sigma * self.sigma;
            for i in 0..n_steps {
                let v_plus = v.max(0.0);
                let vol_dt = (v_plus * dt).sqrt();
                s *= ((self.mu - 0.5 * v_plus) * dt + vol_dt * zs[i]).exp();
                v += kappa * (theta - v_plus) * dt + epsilon * vol_dt * zv[i];
                path[i] = s;
            }
        }
        Ok(paths)
    }
}
