//! Core domain types for option pricing.
//!
//! # Newtype Strategy
//!
//! Solver outputs that are easy to confuse with prices use newtypes: the
//! implied-volatility solver returns a [`Vol`] rather than a bare `f64`.
//! Inputs take raw `f64` inside [`OptionContract`], which validates them once
//! on construction.
//!
//! # Why no `Eq` or `Ord`?
//! Float-carrying types derive `PartialEq` only; `NaN` breaks total ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{self, PricingError};
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// Volatility `σ`, measured as annualized standard deviation.
///
/// A vol of 0.20 represents 20% annualized volatility.
///
/// # Examples
/// ```
/// use optpricing::types::Vol;
/// let vol = Vol(0.20);
/// assert_eq!(vol.0, 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl OptionType {
    /// `+1` for calls, `−1` for puts.
    pub fn sign(self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

/// Parses `"call"` or `"put"` (case-insensitive).
///
/// # Examples
/// ```
/// use optpricing::OptionType;
/// let ty: OptionType = "Put".parse()?;
/// assert_eq!(ty, OptionType::Put);
/// assert!("straddle".parse::<OptionType>().is_err());
/// # Ok::<(), optpricing::PricingError>(())
/// ```
impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(PricingError::InvalidArgument {
                message: format!("option type must be 'call' or 'put', got '{other}'"),
            }),
        }
    }
}

/// A European option contract together with the market state it is priced in.
///
/// Immutable once constructed; every pricing call takes it by reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OptionContractRaw", into = "OptionContractRaw")]
pub struct OptionContract {
    spot: f64,
    strike: f64,
    rate: f64,
    sigma: f64,
    expiry: f64,
    option_type: OptionType,
}

#[derive(Serialize, Deserialize)]
struct OptionContractRaw {
    spot: f64,
    strike: f64,
    rate: f64,
    sigma: f64,
    expiry: f64,
    option_type: OptionType,
}

impl TryFrom<OptionContractRaw> for OptionContract {
    type Error = PricingError;
    fn try_from(raw: OptionContractRaw) -> Result<Self, Self::Error> {
        Self::new(
            raw.spot,
            raw.strike,
            raw.rate,
            raw.sigma,
            raw.expiry,
            raw.option_type,
        )
    }
}

impl From<OptionContract> for OptionContractRaw {
    fn from(c: OptionContract) -> Self {
        Self {
            spot: c.spot,
            strike: c.strike,
            rate: c.rate,
            sigma: c.sigma,
            expiry: c.expiry,
            option_type: c.option_type,
        }
    }
}

impl OptionContract {
    /// Create a contract.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidArgument`] if `spot`, `strike` or
    /// `expiry` is not strictly positive, `sigma` is negative, or any input
    /// is NaN / infinite.
    pub fn new(
        spot: f64,
        strike: f64,
        rate: f64,
        sigma: f64,
        expiry: f64,
        option_type: OptionType,
    ) -> error::Result<Self> {
        validate_positive(spot, "spot")?;
        validate_positive(strike, "strike")?;
        validate_finite(rate, "rate")?;
        validate_non_negative(sigma, "sigma")?;
        validate_positive(expiry, "expiry")?;
        Ok(Self {
            spot,
            strike,
            rate,
            sigma,
            expiry,
            option_type,
        })
    }

    /// Underlying price `S`.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike price `K`.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Continuously-compounded risk-free rate `r`.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Volatility `σ`.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Time to maturity `T` in years.
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Copy with a different spot, revalidated.
    pub fn with_spot(&self, spot: f64) -> error::Result<Self> {
        Self::new(spot, self.strike, self.rate, self.sigma, self.expiry, self.option_type)
    }

    /// Copy with a different volatility, revalidated.
    pub fn with_sigma(&self, sigma: f64) -> error::Result<Self> {
        Self::new(self.spot, self.strike, self.rate, sigma, self.expiry, self.option_type)
    }

    /// Copy with a different rate, revalidated.
    pub fn with_rate(&self, rate: f64) -> error::Result<Self> {
        Self::new(self.spot, self.strike, rate, self.sigma, self.expiry, self.option_type)
    }

    /// Copy with the other option type.
    pub fn with_option_type(&self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..*self
        }
    }
}

/// A first- or second-order sensitivity of the option price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Greek {
    /// ∂V/∂S
    Delta,
    /// ∂²V/∂S²
    Gamma,
    /// ∂V/∂σ
    Vega,
    /// ∂V/∂T
    Theta,
    /// ∂V/∂r
    Rho,
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Greek::Delta => "delta",
            Greek::Gamma => "gamma",
            Greek::Vega => "vega",
            Greek::Theta => "theta",
            Greek::Rho => "rho",
        };
        f.write_str(name)
    }
}

/// How a sensitivity was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Method {
    /// Closed-form derivative.
    Analytic,
    /// `(V(x + h) − V(x)) / h`.
    ForwardDifference { step: f64 },
    /// `(V(x + h) − 2V(x) + V(x − h)) / h²`.
    CentralDifference { step: f64 },
}

impl Method {
    /// Bump size, if the sensitivity came from finite differencing.
    pub fn step(&self) -> Option<f64> {
        match self {
            Method::Analytic => None,
            Method::ForwardDifference { step } | Method::CentralDifference { step } => Some(*step),
        }
    }
}

/// A scalar sensitivity tagged with how it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreekResult {
    pub greek: Greek,
    pub value: f64,
    pub method: Method,
}

impl GreekResult {
    pub(crate) fn analytic(greek: Greek, value: f64) -> Self {
        Self {
            greek,
            value,
            method: Method::Analytic,
        }
    }
}

/// All sensitivities a model could produce for one contract.
///
/// A `None` entry means the model does not support that Greek.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: Option<GreekResult>,
    pub gamma: Option<GreekResult>,
    pub vega: Option<GreekResult>,
    pub theta: Option<GreekResult>,
    pub rho: Option<GreekResult>,
}
