//! Experiment plan configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use kaelion_fit::MSS_TEMPERATURE;
use kaelion_otoc::{DEFAULT_SEED, DynamicsFamily, FamilyParams};

use crate::error::{RunError, RunResult};

/// Default depth schedule.
pub const DEFAULT_DEPTHS: [u32; 7] = [1, 2, 4, 6, 8, 10, 14];

/// Default shots per circuit.
pub const DEFAULT_SHOTS: u32 = 4096;

/// Default number of repeated runs per family.
pub const DEFAULT_RUNS: u32 = 5;

/// Offset between consecutive per-run seeds.
///
/// Large enough that the per-depth streams (`seed + depth·100`) of
/// different runs never collide.
pub const RUN_SEED_STRIDE: u64 = 1000;

/// Full description of an echo experiment.
///
/// Deserializable from a YAML plan file; every field has a default so a
/// plan file only names what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPlan {
    /// Dynamics families to measure.
    pub families: Vec<DynamicsFamily>,
    /// Qubits per echo circuit.
    pub num_qubits: u32,
    /// Forward-evolution depths to sample.
    pub depths: Vec<u32>,
    /// Shots per circuit.
    pub shots: u32,
    /// Repeated runs per family.
    pub runs: u32,
    /// Base seed; run `k` uses `base_seed + k·1000`.
    pub base_seed: u64,
    /// Effective temperature for the MSS normalization.
    pub t_eff: f64,
    /// Whether to apply readout calibration to raw probabilities.
    pub readout_correction: bool,
    /// Structured-family parameters.
    pub params: FamilyParams,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self {
            families: DynamicsFamily::ALL.to_vec(),
            num_qubits: 4,
            depths: DEFAULT_DEPTHS.to_vec(),
            shots: DEFAULT_SHOTS,
            runs: DEFAULT_RUNS,
            base_seed: DEFAULT_SEED,
            t_eff: MSS_TEMPERATURE,
            readout_correction: true,
            params: FamilyParams::default(),
        }
    }
}

impl ExperimentPlan {
    /// Seed for run index `run`.
    pub fn run_seed(&self, run: u32) -> u64 {
        self.base_seed + u64::from(run) * RUN_SEED_STRIDE
    }

    /// Check the plan for inconsistencies before any job is submitted.
    pub fn validate(&self) -> RunResult<()> {
        if self.families.is_empty() {
            return Err(RunError::InvalidPlan("no families selected".into()));
        }
        if self.depths.is_empty() {
            return Err(RunError::InvalidPlan("no depths selected".into()));
        }
        if self.depths.len() < 3 {
            return Err(RunError::InvalidPlan(format!(
                "decay fit needs at least 3 depth points, got {}",
                self.depths.len()
            )));
        }
        if self.num_qubits < 2 {
            return Err(RunError::InvalidPlan(
                "echo protocol needs at least 2 qubits".into(),
            ));
        }
        if self.shots == 0 {
            return Err(RunError::InvalidPlan("shots must be positive".into()));
        }
        if self.runs == 0 {
            return Err(RunError::InvalidPlan("runs must be positive".into()));
        }
        if self.t_eff <= 0.0 {
            return Err(RunError::InvalidPlan(
                "effective temperature must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parse a plan from YAML text.
    pub fn from_yaml(text: &str) -> RunResult<Self> {
        let plan: Self = serde_yaml_ng::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load a plan from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> RunResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}
