//! Experiment reports.
//!
//! The report is the durable output of an experiment: the plan, the
//! per-family summaries, and enough provenance (backend name, timestamp,
//! schema version) to reproduce or compare runs later. Reports serialize
//! to JSON and render as a plain-text table for terminal inspection.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RunResult;
use crate::plan::ExperimentPlan;
use crate::runner::FamilySummary;

/// Bumped whenever the report layout changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete results of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Report layout version.
    pub schema_version: u32,
    /// When the report was assembled.
    pub created_at: DateTime<Utc>,
    /// Name of the backend the circuits ran on.
    pub backend: String,
    /// The plan that produced these results.
    pub plan: ExperimentPlan,
    /// One summary per family, in plan order.
    pub families: Vec<FamilySummary>,
}

impl ExperimentReport {
    pub fn new(backend: &str, plan: ExperimentPlan, families: Vec<FamilySummary>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            backend: backend.to_string(),
            plan,
            families,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> RunResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file.
    pub fn save(&self, path: &Path) -> RunResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Load a previously saved report.
    pub fn load(path: &Path) -> RunResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Render a fixed-width summary table.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "backend: {}  qubits: {}  shots: {}  runs: {}",
            self.backend, self.plan.num_qubits, self.plan.shots, self.plan.runs
        );
        let _ = writeln!(
            out,
            "{:<14} {:>8} {:>8} {:>9} {:>8} {:>8}",
            "family", "lambda", "std", "err%", "alpha", "a_err"
        );
        for summary in &self.families {
            let _ = writeln!(
                out,
                "{:<14} {:>8.4} {:>8.4} {:>8.2}% {:>8.4} {:>8.4}",
                summary.family.to_string(),
                summary.lambda,
                summary.statistics.std,
                summary.statistics.percent_error,
                summary.alpha,
                summary.alpha_err,
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report() -> ExperimentReport {
        ExperimentReport::new("simulator", ExperimentPlan::default(), Vec::new())
    }

    #[test]
    fn test_json_round_trip() {
        let report = empty_report();
        let json = report.to_json_pretty().unwrap();
        let back: ExperimentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_table_lists_backend() {
        let table = empty_report().render_table();
        assert!(table.contains("backend: simulator"));
        assert!(table.contains("family"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = empty_report();
        report.save(&path).unwrap();
        let loaded = ExperimentReport::load(&path).unwrap();
        assert_eq!(loaded, report);
    }
}
