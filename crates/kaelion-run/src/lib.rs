//! Experiment orchestration for echo measurements.
//!
//! This crate turns an [`ExperimentPlan`] into measured results on any
//! [`kaelion_hal::Backend`]: the [`Runner`] drives the multi-run decay
//! measurement, [`calibrate_readout`] measures readout fidelities for
//! correction, [`ZneRunner`] adds zero-noise extrapolation, and
//! [`VariabilityStudy`] diagnoses whether run-to-run spread comes from
//! the circuit seeds or the backend. Results assemble into a JSON
//! [`ExperimentReport`].

pub mod calibrate;
pub mod error;
pub mod plan;
pub mod report;
pub mod runner;
pub mod variability;
pub mod zne;

pub use calibrate::calibrate_readout;
pub use error::{RunError, RunResult};
pub use plan::{ExperimentPlan, RUN_SEED_STRIDE};
pub use report::{ExperimentReport, SCHEMA_VERSION};
pub use runner::{DepthPoint, FamilySummary, RunRecord, Runner};
pub use variability::{VariabilityReport, VariabilityStudy, Verdict};
pub use zne::{FOLD_FACTORS, ZneRunner, ZneSummary};
