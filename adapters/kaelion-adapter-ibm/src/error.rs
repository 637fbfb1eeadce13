//! Error types for the IBM Quantum adapter.

use thiserror::Error;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when talking to IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Missing API key.
    #[error("IBM API key not found. Set the IBM_API_KEY environment variable.")]
    MissingApiKey,

    /// Missing service CRN.
    #[error("IBM_SERVICE_CRN environment variable is required alongside IBM_API_KEY")]
    MissingServiceCrn,

    /// Invalid API token.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    Api {
        /// Error code from the API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// No operational device matched the selection criteria.
    #[error("No operational backend with at least {0} qubits")]
    NoSuitableBackend(u32),

    /// Circuit conversion error.
    #[error("Circuit conversion error: {0}")]
    CircuitConversion(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for kaelion_hal::HalError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::MissingApiKey
            | IbmError::MissingServiceCrn
            | IbmError::InvalidToken
            | IbmError::IamTokenExchange(_) => {
                kaelion_hal::HalError::AuthenticationFailed(e.to_string())
            }
            IbmError::JobNotFound(id) => kaelion_hal::HalError::JobNotFound(id),
            IbmError::BackendUnavailable(msg) | IbmError::Api { message: msg, .. } => {
                kaelion_hal::HalError::Backend(msg)
            }
            IbmError::NoSuitableBackend(_) => {
                kaelion_hal::HalError::BackendUnavailable(e.to_string())
            }
            IbmError::CircuitConversion(msg) => kaelion_hal::HalError::InvalidCircuit(msg),
            other => kaelion_hal::HalError::Backend(other.to_string()),
        }
    }
}
