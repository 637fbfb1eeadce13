//! Kaelion Hardware Abstraction Layer
//!
//! This crate provides a unified interface for running echo circuits on
//! quantum backends, so the experiment runner works identically against
//! the local statevector simulator and IBM Quantum hardware.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for job submission and management
//! - [`Capabilities`] to describe hardware features and constraints
//! - Job lifecycle tracking via [`Job`], [`JobId`], and [`JobStatus`]
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use kaelion_hal::Backend;
//! use kaelion_adapter_sim::SimulatorBackend;
//! use kaelion_ir::{Circuit, QubitId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut circuit = Circuit::with_size("bell", 2, 2);
//!     circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
//!     circuit.measure_all()?;
//!
//!     let backend = SimulatorBackend::new();
//!     let job_id = backend.submit(&circuit, 4096).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     println!("P(00) = {}", result.return_probability(2));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, ValidationResult};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
