//! Random draw buffers and their generation.
//!
//! Randomness is always explicit: buffers are generated from a [`StdRng`]
//! seeded by the caller (or by OS entropy when no seed is configured) and are
//! then only ever read. Reusing one buffer across the base and bumped
//! valuations of a Greek is what makes the finite differences low-noise
//! (common random numbers).

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson, StandardNormal};

use super::jump_diffusion::JumpParams;
use super::DrawBuffer;
use crate::error::{self, PricingError};
use crate::validate::{validate_correlation, validate_shape};

/// Draws consumed by the jump-diffusion / GBM Monte Carlo engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloDraws {
    /// Standard normal diffusion shocks, `(time_steps, num_sims)`.
    pub normals: DrawBuffer,
    /// Per-step log jump, `N(μ_j, σ_j) × Poisson(λ·dt)`, same shape.
    /// Required by an engine with the jump model enabled.
    pub jumps: Option<DrawBuffer>,
}

impl MonteCarloDraws {
    /// Diffusion shocks only.
    pub fn new(normals: DrawBuffer) -> Self {
        Self {
            normals,
            jumps: None,
        }
    }

    /// Attach a jump component.
    pub fn with_jumps(mut self, jumps: DrawBuffer) -> Self {
        self.jumps = Some(jumps);
        self
    }

    /// `(time_steps, num_sims)` of the diffusion shocks.
    pub fn shape(&self) -> (usize, usize) {
        self.normals.shape()
    }
}

/// Correlated bivariate normal shocks for the Heston engine.
///
/// Both marginals have shape `(time_steps, num_sims)`; element-wise they are
/// standard normals with correlation `corr`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedDraws {
    /// Shocks driving the price.
    pub price: DrawBuffer,
    /// Shocks driving the variance.
    pub variance: DrawBuffer,
}

impl CorrelatedDraws {
    /// Pair two pre-correlated marginals.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if the shapes differ.
    pub fn new(price: DrawBuffer, variance: DrawBuffer) -> error::Result<Self> {
        validate_shape(variance.shape(), price.shape(), "variance draws")?;
        Ok(Self { price, variance })
    }

    /// Correlate two independent standard normal blocks:
    /// `variance = corr·z₁ + √(1 − corr²)·z₂`.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `corr ∉ [−1, 1]` or the
    /// shapes differ.
    pub fn from_independent(
        price: DrawBuffer,
        independent: &DrawBuffer,
        corr: f64,
    ) -> error::Result<Self> {
        validate_correlation(corr, "corr")?;
        validate_shape(independent.shape(), price.shape(), "independent draws")?;
        let orthogonal = (1.0 - corr * corr).sqrt();
        let variance = price.zip_map(independent, |z1, z2| corr * z1 + orthogonal * z2);
        Ok(Self { price, variance })
    }

    /// `(time_steps, num_sims)` of each marginal.
    pub fn shape(&self) -> (usize, usize) {
        self.price.shape()
    }
}

/// A generator seeded from `seed`, or from OS entropy when `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Seed for the `stream`-th independent sub-stream of `base`.
pub(crate) fn stream_seed(base: u64, stream: usize) -> u64 {
    base.wrapping_add((stream as u64).wrapping_mul(7_919))
}

/// A `(time_steps, num_sims)` block of independent standard normals.
pub fn standard_normals<R: Rng + ?Sized>(
    rng: &mut R,
    time_steps: usize,
    num_sims: usize,
) -> DrawBuffer {
    DMatrix::from_fn(time_steps, num_sims, |_, _| {
        let z: f64 = StandardNormal.sample(rng);
        z
    })
}

/// A `(time_steps, num_sims)` block of Merton jump components over steps of
/// length `dt`: each entry is a jump size `N(μ_j, σ_j)` scaled by a
/// `Poisson(λ·dt)` jump count.
///
/// # Errors
/// Returns [`PricingError::InvalidArgument`] if the jump distribution cannot
/// be built from `params` and `dt`.
pub fn jump_components<R: Rng + ?Sized>(
    rng: &mut R,
    time_steps: usize,
    num_sims: usize,
    dt: f64,
    params: &JumpParams,
) -> error::Result<DrawBuffer> {
    if params.intensity() == 0.0 {
        return Ok(DMatrix::zeros(time_steps, num_sims));
    }
    let size = Normal::new(params.mean(), params.volatility()).map_err(|e| {
        PricingError::InvalidArgument {
            message: format!("invalid jump size distribution: {e}"),
        }
    })?;
    let count = Poisson::new(params.intensity() * dt).map_err(|e| {
        PricingError::InvalidArgument {
            message: format!("invalid jump count distribution: {e}"),
        }
    })?;
    Ok(DMatrix::from_fn(time_steps, num_sims, |_, _| {
        let jumps: f64 = count.sample(rng);
        if jumps == 0.0 {
            0.0
        } else {
            size.sample(rng) * jumps
        }
    }))
}

/// A `(time_steps, num_sims)` pair of standard normal blocks with correlation `corr`.
///
/// # Errors
/// Returns [`PricingError::InvalidArgument`] if `corr ∉ [−1, 1]`.
pub fn correlated_normals<R: Rng + ?Sized>(
    rng: &mut R,
    time_steps: usize,
    num_sims: usize,
    corr: f64,
) -> error::Result<CorrelatedDraws> {
    let price = standard_normals(rng, time_steps, num_sims);
    let independent = standard_normals(rng, time_steps, num_sims);
    CorrelatedDraws::from_independent(price, &independent, corr)
}
