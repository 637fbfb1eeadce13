//! IBM Quantum backend adapter.
//!
//! Connects echo experiments to IBM Quantum hardware through the Cloud
//! REST API: IAM key exchange, least-busy device selection, OpenQASM 3
//! submission via the Sampler V2 primitive, and counts retrieval.
//!
//! Credentials come from the environment:
//! - `IBM_API_KEY`: IBM Cloud API key
//! - `IBM_SERVICE_CRN`: Quantum service instance CRN

pub mod api;
pub mod backend;
pub mod error;
pub mod qasm;

pub use backend::IbmBackend;
pub use error::{IbmError, IbmResult};
