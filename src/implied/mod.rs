//! Implied volatility extraction from option prices.
//!
//! - [`ImpliedVolSolver`] — Newton-Raphson on the Black-Scholes price with
//!   vega as derivative, seeded by the Brenner-Subrahmanyam approximation

pub mod newton;

pub use newton::ImpliedVolSolver;
