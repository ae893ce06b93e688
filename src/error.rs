//! Error types for the optpricing library.
//!
//! All fallible operations return `Result<T, PricingError>` rather than panicking.
//! Errors are raised synchronously at the offending call and are never retried:
//! a structurally invalid input stays invalid.

use thiserror::Error;

use crate::types::Greek;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur while pricing an option or computing a sensitivity.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PricingError {
    /// Input data is invalid (e.g., non-positive spot, negative vol, wrong
    /// draw-buffer shape, unknown option type).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An iterative solver failed to converge.
    #[error("numerical failure after {iterations} iterations: {message}")]
    NumericalFailure {
        message: String,
        /// Iterations performed before giving up.
        iterations: usize,
    },

    /// The input is valid but too small to discretize (e.g., an expiry that
    /// yields zero simulation steps).
    #[error("degenerate input: {message}")]
    DegenerateInput { message: String },

    /// The model does not provide this sensitivity.
    #[error("{greek} is not supported by the {model} model")]
    Unsupported {
        greek: Greek,
        /// Model that was asked (e.g., "Heston").
        model: &'static str,
    },
}
