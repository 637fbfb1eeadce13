//! Error types for fitting operations.

use thiserror::Error;

/// Errors that can occur while fitting decay data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FitError {
    /// Too few data points for a three-parameter fit.
    #[error("Need at least {required} data points for the fit, got {actual}")]
    NotEnoughPoints {
        /// Minimum number of points required.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// Data contains a non-finite value.
    #[error("Non-finite value in fit data at index {0}")]
    NonFiniteData(usize),

    /// The normal equations became singular.
    #[error("Singular normal equations, data does not constrain the model")]
    Singular,

    /// Mismatched input lengths.
    #[error("Input length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first input.
        left: usize,
        /// Length of the second input.
        right: usize,
    },
}

/// Result type for fitting operations.
pub type FitResult<T> = Result<T, FitError>;
