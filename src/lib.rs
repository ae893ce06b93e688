//! # optpricing
//!
//! European option pricing and Greeks under three models of the underlying:
//! closed-form Black-Scholes, Monte Carlo Merton jump-diffusion (or plain
//! GBM), and Monte Carlo Heston stochastic volatility.
//!
//! ## Architecture
//!
//! - **`engine`** — The three pricing engines behind one [`PricingModel`] trait
//! - **`implied`** — Newton-Raphson implied volatility for the closed form
//! - **`simulation`** — Path generators (GBM, jump-diffusion, Heston) and draw buffers
//! - **`payoff`** — Per-path payoff evaluation consumed by the simulation engines
//! - **`conventions`** — Trading-hour discretization and discounting
//!
//! ## Design
//!
//! - **One contract type, one trait.** Every engine prices an
//!   [`OptionContract`] through [`PricingModel`]. Greeks a model does not
//!   provide return [`PricingError::Unsupported`] instead of a guess.
//! - **Explicit randomness.** Simulation engines never touch a global
//!   generator. Draws come from a caller-supplied buffer or from a
//!   [`StdRng`](rand::rngs::StdRng) seeded by the engine configuration.
//! - **Common random numbers.** A finite-difference Greek replays one
//!   immutable draw buffer for all of its valuations.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Thread-safe.** Engines and payoff evaluators are `Send + Sync`;
//!   the `parallel` feature prices Monte Carlo sub-batches on rayon.
//! - **Serializable.** Contracts, model parameters and engine configurations
//!   implement Serde `Serialize` / `Deserialize` with validation on
//!   deserialization.

pub mod conventions;
pub mod engine;
pub mod error;
pub mod implied;
mod math;
pub mod payoff;
pub mod simulation;
pub mod types;
mod validate;

#[doc(inline)]
pub use engine::{
    AnalyticEngine, MonteCarloConfig, MonteCarloEngine, PricingModel, StochasticVolatilityConfig,
    StochasticVolatilityEngine,
};
#[doc(inline)]
pub use error::{PricingError, Result};
#[doc(inline)]
pub use implied::ImpliedVolSolver;
#[doc(inline)]
pub use payoff::{EuropeanPayoff, PayoffEvaluator};
#[doc(inline)]
pub use types::{Greek, GreekResult, Greeks, Method, OptionContract, OptionType, Vol};
