//! Experiment runner.
//!
//! Drives a backend through the full echo measurement: per family, `runs`
//! independent repetitions, each building one echo circuit per depth,
//! collecting F(d), applying readout correction, and fitting the decay.
//! Per-run λ values are summarized into a [`FamilySummary`].
//!
//! Each run draws its circuits from a distinct recorded seed
//! (`base_seed + run·1000`). Reusing one seed across runs would repeat
//! identical circuits and report hardware noise as run-to-run spread.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use kaelion_fit::{
    DecayFit, ReadoutCalibration, RunStatistics, alpha, bootstrap_lambda, fit_decay,
    lambda_normalized, mean,
};
use kaelion_hal::Backend;
use kaelion_otoc::{DynamicsFamily, EchoSpec};

use crate::error::RunResult;
use crate::plan::ExperimentPlan;
use crate::report::ExperimentReport;

/// Bootstrap resamples for the per-family confidence estimate.
const BOOTSTRAP_RESAMPLES: usize = 200;

/// One measured depth point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthPoint {
    /// Forward-evolution depth.
    pub depth: u32,
    /// Raw echo return probability.
    pub raw: f64,
    /// Readout-corrected probability (equals `raw` when uncorrected).
    pub corrected: f64,
}

/// One complete run: a full depth sweep with its fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run index within the family.
    pub run: u32,
    /// Seed the circuits were drawn from.
    pub seed: u64,
    /// Measured depth points, in depth order.
    pub points: Vec<DepthPoint>,
    /// Fitted decay parameters.
    pub fit: DecayFit,
    /// Normalized chaos parameter λ = clip(λ_L / 2πT, 0, 1).
    pub lambda: f64,
    /// Derived α = -0.5 - λ.
    pub alpha: f64,
}

/// Aggregated results for one dynamics family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    /// The dynamics family.
    pub family: DynamicsFamily,
    /// Per-run records with their seeds.
    pub runs: Vec<RunRecord>,
    /// Statistics over per-run λ values.
    pub statistics: RunStatistics,
    /// Mean λ across runs.
    pub lambda: f64,
    /// Mean unnormalized Lyapunov exponent λ_L across runs.
    pub lambda_l: f64,
    /// α = -0.5 - mean λ.
    pub alpha: f64,
    /// Error bar on α (equals the λ standard deviation).
    pub alpha_err: f64,
    /// Bootstrap spread of λ_L over the mean depth curve, when the
    /// resampled fits converge.
    pub bootstrap: Option<RunStatistics>,
}

/// Drives echo experiments against a backend.
pub struct Runner<'a> {
    backend: &'a dyn Backend,
    plan: ExperimentPlan,
    calibration: ReadoutCalibration,
}

impl<'a> Runner<'a> {
    /// Create a runner with no readout correction.
    pub fn new(backend: &'a dyn Backend, plan: ExperimentPlan) -> Self {
        Self {
            backend,
            plan,
            calibration: ReadoutCalibration::ideal(),
        }
    }

    /// Attach a measured readout calibration.
    pub fn with_calibration(mut self, calibration: ReadoutCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// The plan this runner executes.
    pub fn plan(&self) -> &ExperimentPlan {
        &self.plan
    }

    /// Run the full experiment and assemble the report.
    pub async fn run(&self) -> RunResult<ExperimentReport> {
        self.plan.validate()?;

        let mut families = Vec::with_capacity(self.plan.families.len());
        for &family in &self.plan.families {
            families.push(self.run_family(family).await?);
        }

        Ok(ExperimentReport::new(
            self.backend.name(),
            self.plan.clone(),
            families,
        ))
    }

    /// Measure one family across all runs and summarize.
    #[instrument(skip(self), fields(family = %family))]
    pub async fn run_family(&self, family: DynamicsFamily) -> RunResult<FamilySummary> {
        let mut runs = Vec::with_capacity(self.plan.runs as usize);

        for run in 0..self.plan.runs {
            let seed = self.plan.run_seed(run);
            let points = self.measure_curve(family, seed).await?;

            let data: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (f64::from(p.depth), p.corrected))
                .collect();
            let fit = fit_decay(&data)?;
            let lambda = lambda_normalized(fit.lambda_l, self.plan.t_eff);

            info!(
                run,
                seed,
                lambda_l = fit.lambda_l,
                lambda,
                "run complete"
            );

            runs.push(RunRecord {
                run,
                seed,
                points,
                fit,
                lambda,
                alpha: alpha(lambda),
            });
        }

        Ok(self.summarize(family, runs))
    }

    /// Submit one echo circuit per depth and collect F(d).
    async fn measure_curve(
        &self,
        family: DynamicsFamily,
        seed: u64,
    ) -> RunResult<Vec<DepthPoint>> {
        let mut points = Vec::with_capacity(self.plan.depths.len());

        for &depth in &self.plan.depths {
            let spec = EchoSpec::new(family, self.plan.num_qubits, depth)
                .with_seed(seed)
                .with_params(self.plan.params);
            let circuit = spec.build()?;

            let job_id = self.backend.submit(&circuit, self.plan.shots).await?;
            let result = self.backend.wait(&job_id).await?;

            let raw = result.return_probability(self.plan.num_qubits as usize);
            let corrected = if self.plan.readout_correction {
                self.calibration.correct(raw)
            } else {
                raw
            };

            debug!(depth, raw, corrected, "depth point measured");
            points.push(DepthPoint {
                depth,
                raw,
                corrected,
            });
        }

        Ok(points)
    }

    fn summarize(&self, family: DynamicsFamily, runs: Vec<RunRecord>) -> FamilySummary {
        let lambdas: Vec<f64> = runs.iter().map(|r| r.lambda).collect();
        let lambda_ls: Vec<f64> = runs.iter().map(|r| r.fit.lambda_l).collect();
        let statistics = RunStatistics::from_values(lambdas);

        // Bootstrap over the run-averaged curve gives a confidence
        // estimate that does not require more hardware time.
        let mean_curve: Vec<(f64, f64)> = self
            .plan
            .depths
            .iter()
            .enumerate()
            .map(|(i, &depth)| {
                let at_depth: Vec<f64> = runs.iter().map(|r| r.points[i].corrected).collect();
                (f64::from(depth), mean(&at_depth))
            })
            .collect();
        let bootstrap =
            bootstrap_lambda(&mean_curve, BOOTSTRAP_RESAMPLES, self.plan.base_seed).ok();

        let lambda = statistics.mean;
        FamilySummary {
            family,
            runs,
            lambda,
            lambda_l: mean(&lambda_ls),
            alpha: alpha(lambda),
            alpha_err: statistics.std,
            statistics,
            bootstrap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaelion_adapter_sim::SimulatorBackend;

    fn small_plan(families: Vec<DynamicsFamily>) -> ExperimentPlan {
        ExperimentPlan {
            families,
            depths: vec![1, 2, 4, 6],
            shots: 1024,
            runs: 2,
            ..ExperimentPlan::default()
        }
    }

    #[tokio::test]
    async fn test_run_family_records_seeds() {
        let sim = SimulatorBackend::new().with_seed(0);
        let runner = Runner::new(&sim, small_plan(vec![DynamicsFamily::Integrable]));

        let summary = runner.run_family(DynamicsFamily::Integrable).await.unwrap();
        assert_eq!(summary.runs.len(), 2);
        assert_eq!(summary.runs[0].seed, 42);
        assert_eq!(summary.runs[1].seed, 1042);
        for run in &summary.runs {
            assert_eq!(run.points.len(), 4);
            for p in &run.points {
                assert!((0.0..=1.0).contains(&p.raw));
                assert_eq!(p.raw, p.corrected); // ideal calibration
            }
        }
    }

    #[tokio::test]
    async fn test_lambda_and_alpha_relation() {
        let sim = SimulatorBackend::new().with_seed(0);
        let runner = Runner::new(&sim, small_plan(vec![DynamicsFamily::Chaotic]));

        let summary = runner.run_family(DynamicsFamily::Chaotic).await.unwrap();
        assert!((0.0..=1.0).contains(&summary.lambda));
        assert!((summary.alpha - (-0.5 - summary.lambda)).abs() < 1e-12);
        assert_eq!(summary.statistics.num_runs(), 2);
    }

    #[tokio::test]
    async fn test_full_run_covers_all_families() {
        let sim = SimulatorBackend::new().with_seed(0);
        let plan = small_plan(vec![DynamicsFamily::Integrable, DynamicsFamily::KickedIsing]);
        let runner = Runner::new(&sim, plan);

        let report = runner.run().await.unwrap();
        assert_eq!(report.families.len(), 2);
        assert_eq!(report.backend, "simulator");
    }

    #[tokio::test]
    async fn test_calibration_applies_correction() {
        let sim = SimulatorBackend::new().with_seed(0);
        // Synthetic 80% readout fidelity: factor 1/0.8 = 1.25.
        let cal = ReadoutCalibration::new(0.8, 0.8);
        let runner =
            Runner::new(&sim, small_plan(vec![DynamicsFamily::Integrable])).with_calibration(cal);

        let summary = runner.run_family(DynamicsFamily::Integrable).await.unwrap();
        for p in &summary.runs[0].points {
            let expected = (p.raw * 1.25).min(1.0);
            assert!((p.corrected - expected).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_invalid_plan_is_rejected() {
        let sim = SimulatorBackend::new();
        let mut plan = ExperimentPlan::default();
        plan.depths = vec![1];
        let runner = Runner::new(&sim, plan);
        assert!(runner.run().await.is_err());
    }
}
