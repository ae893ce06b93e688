//! Payoff evaluation for simulated paths.
//!
//! A [`PayoffEvaluator`] maps a `(time_steps, num_sims)` matrix of simulated
//! prices to one payoff per path. The simulation engines only ever see this
//! trait, so any payoff written against the full path can be plugged in via
//! `with_payoff`.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error;
use crate::simulation::SimulationPaths;
use crate::types::{OptionContract, OptionType};
use crate::validate::validate_positive;

/// Per-path payoff of a contract.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so engines can be shared across
/// pricing threads.
pub trait PayoffEvaluator: Send + Sync + std::fmt::Debug {
    /// One payoff per column of `paths`.
    fn evaluate(&self, paths: &SimulationPaths) -> DVector<f64>;
}

/// European call or put payoff on the terminal price.
///
/// # Examples
/// ```
/// use nalgebra::DMatrix;
/// use optpricing::payoff::{EuropeanPayoff, PayoffEvaluator};
/// use optpricing::OptionType;
///
/// let payoff = EuropeanPayoff::new(100.0, OptionType::Call)?;
/// // two steps, three paths; the second row is terminal
/// let paths = DMatrix::from_row_slice(2, 3, &[90.0, 100.0, 110.0, 95.0, 105.0, 120.0]);
/// let values = payoff.evaluate(&paths);
/// assert_eq!(values.as_slice(), &[0.0, 5.0, 20.0]);
/// # Ok::<(), optpricing::PricingError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuropeanPayoff {
    strike: f64,
    option_type: OptionType,
}

impl EuropeanPayoff {
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`](crate::PricingError::InvalidArgument)
    /// if `strike` is not positive and finite.
    pub fn new(strike: f64, option_type: OptionType) -> error::Result<Self> {
        validate_positive(strike, "strike")?;
        Ok(Self {
            strike,
            option_type,
        })
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Payoff at a single terminal price.
    pub fn intrinsic(&self, terminal: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (terminal - self.strike).max(0.0),
            OptionType::Put => (self.strike - terminal).max(0.0),
        }
    }
}

impl From<&OptionContract> for EuropeanPayoff {
    fn from(contract: &OptionContract) -> Self {
        Self {
            strike: contract.strike(),
            option_type: contract.option_type(),
        }
    }
}

impl PayoffEvaluator for EuropeanPayoff {
    fn evaluate(&self, paths: &SimulationPaths) -> DVector<f64> {
        match paths.nrows().checked_sub(1) {
            Some(last) => DVector::from_iterator(
                paths.ncols(),
                paths.row(last).iter().map(|&s| self.intrinsic(s)),
            ),
            None => DVector::zeros(paths.ncols()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn call_and_put_intrinsic() {
        let call = EuropeanPayoff::new(100.0, OptionType::Call).unwrap();
        let put = EuropeanPayoff::new(100.0, OptionType::Put).unwrap();
        assert_eq!(call.intrinsic(120.0), 20.0);
        assert_eq!(call.intrinsic(80.0), 0.0);
        assert_eq!(put.intrinsic(80.0), 20.0);
        assert_eq!(put.intrinsic(120.0), 0.0);
    }

    #[test]
    fn uses_terminal_row_only() {
        let put = EuropeanPayoff::new(100.0, OptionType::Put).unwrap();
        // path 0 dips below strike mid-way but finishes above
        let paths = DMatrix::from_row_slice(3, 2, &[50.0, 100.0, 60.0, 100.0, 110.0, 90.0]);
        assert_eq!(put.evaluate(&paths).as_slice(), &[0.0, 10.0]);
    }

    #[test]
    fn empty_paths_pay_nothing() {
        let call = EuropeanPayoff::new(100.0, OptionType::Call).unwrap();
        let paths = DMatrix::<f64>::zeros(0, 4);
        assert_eq!(call.evaluate(&paths), DVector::zeros(4));
    }

    #[test]
    fn from_contract() {
        let c = OptionContract::new(100.0, 95.0, 0.01, 0.2, 1.0, OptionType::Put).unwrap();
        let p = EuropeanPayoff::from(&c);
        assert_eq!(p.strike(), 95.0);
        assert_eq!(p.option_type(), OptionType::Put);
    }

    #[test]
    fn rejects_bad_strike() {
        assert!(EuropeanPayoff::new(0.0, OptionType::Call).is_err());
        assert!(EuropeanPayoff::new(f64::NAN, OptionType::Call).is_err());
    }
}
