//! Geometric Brownian motion paths.
//!
//! ```text
//! dS = μ·S·dt + σ·S·dW
//! S_{t+dt} = S_t · exp((μ − σ²/2)·dt + σ·√dt·z)
//! ```
//!
//! The log step is exact, so the terminal distribution carries no
//! discretization bias. With `σ = 0` every path is the deterministic
//! `S₀·e^(μt)`.

use nalgebra::DMatrix;

use super::{DrawBuffer, SimulationPaths};
use crate::error;
use crate::validate::{validate_finite, validate_non_negative, validate_positive, validate_shape};

/// GBM path generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmSimulator {
    s0: f64,
    mu: f64,
    sigma: f64,
    expiry: f64,
}

impl GbmSimulator {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`](crate::PricingError::InvalidArgument)
    /// for a non-positive `s0` or `expiry`, a negative `sigma`, or a non-finite drift.
    pub fn new(s0: f64, mu: f64, sigma: f64, expiry: f64) -> error::Result<Self> {
        validate_positive(s0, "s0")?;
        validate_finite(mu, "mu")?;
        validate_non_negative(sigma, "sigma")?;
        validate_positive(expiry, "expiry")?;
        Ok(Self {
            s0,
            mu,
            sigma,
            expiry,
        })
    }

    /// Simulate `num_sims` paths of `n_steps` steps from a standard normal buffer.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`](crate::PricingError::InvalidArgument)
    /// if `draws` is not exactly `(n_steps, num_sims)`.
    pub fn simulate(
        &self,
        n_steps: usize,
        num_sims: usize,
        draws: &DrawBuffer,
    ) -> error::Result<SimulationPaths> {
        validate_shape(draws.shape(), (n_steps, num_sims), "normal draws")?;

        let dt = self.expiry / n_steps as f64;
        let drift = (self.mu - 0.5 * self.sigma * self.sigma) * dt;
        let diffusion = self.sigma * dt.sqrt();

        let mut paths = DMatrix::zeros(n_steps, num_sims);
        for (mut path, z) in paths.column_iter_mut().zip(draws.column_iter()) {
            let mut s = self.s0;
            for i in 0..n_steps {
                s *= diffusion.mul_add(z[i], drift).exp();
                path[i] = s;
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::draws::{seeded_rng, standard_normals};
    use approx::assert_relative_eq;

    #[test]
    fn zero_vol_is_deterministic_growth() {
        let sim = GbmSimulator::new(100.0, 0.05, 0.0, 1.0).unwrap();
        let draws = standard_normals(&mut seeded_rng(Some(1)), 10, 3);
        let paths = sim.simulate(10, 3, &draws).unwrap();
        for j in 0..3 {
            assert_relative_eq!(paths[(9, j)], 100.0 * 0.05_f64.exp(), max_relative = 1e-12);
            assert_relative_eq!(paths[(4, j)], 100.0 * (0.05_f64 * 0.5).exp(), max_relative = 1e-12);
        }
    }

    #[test]
    fn paths_scale_linearly_with_spot() {
        let draws = standard_normals(&mut seeded_rng(Some(2)), 12, 8);
        let a = GbmSimulator::new(100.0, 0.03, 0.25, 0.5).unwrap().simulate(12, 8, &draws).unwrap();
        let b = GbmSimulator::new(200.0, 0.03, 0.25, 0.5).unwrap().simulate(12, 8, &draws).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(2.0 * x, *y, max_relative = 1e-12);
        }
    }

    #[test]
    fn terminal_mean_is_forward() {
        let draws = standard_normals(&mut seeded_rng(Some(3)), 4, 200_000);
        let paths = GbmSimulator::new(100.0, 0.05, 0.2, 1.0)
            .unwrap()
            .simulate(4, 200_000, &draws)
            .unwrap();
        let mean = paths.row(3).mean();
        assert_relative_eq!(mean, 100.0 * 0.05_f64.exp(), max_relative = 3e-3);
    }

    #[test]
    fn rejects_mismatched_draws() {
        let sim = GbmSimulator::new(100.0, 0.05, 0.2, 1.0).unwrap();
        let draws = standard_normals(&mut seeded_rng(Some(4)), 10, 3);
        assert!(sim.simulate(10, 4, &draws).is_err());
        assert!(sim.simulate(9, 3, &draws).is_err());
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(GbmSimulator::new(0.0, 0.05, 0.2, 1.0).is_err());
        assert!(GbmSimulator::new(100.0, f64::NAN, 0.2, 1.0).is_err());
        assert!(GbmSimulator::new(100.0, 0.05, -0.2, 1.0).is_err());
        assert!(GbmSimulator::new(100.0, 0.05, 0.2, 0.0).is_err());
    }
}
