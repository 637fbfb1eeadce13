//! Error types for the experiment runner.

use thiserror::Error;

/// Errors that can occur while running experiments.
#[derive(Debug, Error)]
pub enum RunError {
    /// Backend operation failed.
    #[error(transparent)]
    Hal(#[from] kaelion_hal::HalError),

    /// Circuit construction failed.
    #[error(transparent)]
    Ir(#[from] kaelion_ir::IrError),

    /// Curve fitting failed.
    #[error(transparent)]
    Fit(#[from] kaelion_fit::FitError),

    /// Experiment plan is inconsistent.
    #[error("invalid experiment plan: {0}")]
    InvalidPlan(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Plan file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Report serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for runner operations.
pub type RunResult<T> = Result<T, RunError>;
