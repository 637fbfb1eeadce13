//! Seed-versus-hardware variability diagnosis.
//!
//! When repeated experiments disagree, the spread has two possible
//! sources: the seeded circuit draw (some seeds produce weakly
//! scrambling layers) or backend noise drift between submissions. The
//! study separates them in two stages. First each named seed is rerun
//! and its λ remeasured; a seed whose λ stays below [`SEED_THRESHOLD`]
//! draws a genuinely weak circuit. Second a single fixed seed is
//! repeated several times, so any remaining spread is purely the
//! backend; a standard deviation above [`HARDWARE_STD_THRESHOLD`]
//! indicates noise drift.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use kaelion_fit::{RunStatistics, fit_decay, lambda_normalized};
use kaelion_hal::Backend;
use kaelion_otoc::{DynamicsFamily, EchoSpec};

use crate::error::{RunError, RunResult};
use crate::plan::ExperimentPlan;

/// A rerun seed yielding λ below this is drawing a weak circuit.
pub const SEED_THRESHOLD: f64 = 0.5;

/// Fixed-seed λ spread above this indicates backend noise drift.
pub const HARDWARE_STD_THRESHOLD: f64 = 0.1;

/// Default number of fixed-seed repetitions.
pub const DEFAULT_FIXED_REPEATS: u32 = 3;

/// Outcome of the two-stage diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Some named seeds consistently draw weakly scrambling circuits.
    SeedLimited,
    /// The backend itself is drifting between submissions.
    HardwareNoise,
    /// Both effects are present.
    Both,
    /// Neither threshold was crossed.
    Stable,
}

impl Verdict {
    fn from_flags(seed_limited: bool, hardware_noisy: bool) -> Self {
        match (seed_limited, hardware_noisy) {
            (true, true) => Verdict::Both,
            (true, false) => Verdict::SeedLimited,
            (false, true) => Verdict::HardwareNoise,
            (false, false) => Verdict::Stable,
        }
    }
}

/// One rerun seed and the λ it produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedResult {
    pub seed: u64,
    pub lambda: f64,
    /// True when λ fell below [`SEED_THRESHOLD`].
    pub below_threshold: bool,
}

/// Results of the full diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariabilityReport {
    pub family: DynamicsFamily,
    /// Stage 1: each named seed rerun once.
    pub seed_results: Vec<SeedResult>,
    /// Stage 2: the fixed seed used for the repetition series.
    pub fixed_seed: u64,
    /// λ from each fixed-seed repetition.
    pub fixed_statistics: RunStatistics,
    pub verdict: Verdict,
}

/// Runs the two-stage variability diagnosis against a backend.
pub struct VariabilityStudy<'a> {
    backend: &'a dyn Backend,
    plan: ExperimentPlan,
    seeds: Vec<u64>,
    repeats: u32,
}

impl<'a> VariabilityStudy<'a> {
    /// Diagnose the seeds the plan would use, in run order.
    pub fn new(backend: &'a dyn Backend, plan: ExperimentPlan) -> Self {
        let seeds = (0..plan.runs).map(|r| plan.run_seed(r)).collect();
        Self {
            backend,
            plan,
            seeds,
            repeats: DEFAULT_FIXED_REPEATS,
        }
    }

    /// Diagnose a specific set of suspect seeds instead.
    pub fn with_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Override the number of fixed-seed repetitions.
    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats;
        self
    }

    /// Run both stages for one family and return the verdict.
    #[instrument(skip(self), fields(family = %family))]
    pub async fn run(&self, family: DynamicsFamily) -> RunResult<VariabilityReport> {
        self.plan.validate()?;
        if self.seeds.is_empty() {
            return Err(RunError::InvalidPlan(
                "variability study needs at least one seed".into(),
            ));
        }
        if self.repeats < 2 {
            return Err(RunError::InvalidPlan(
                "fixed-seed stage needs at least two repetitions".into(),
            ));
        }

        let mut seed_results = Vec::with_capacity(self.seeds.len());
        for &seed in &self.seeds {
            let lambda = self.measure_lambda(family, seed).await?;
            debug!(seed, lambda, "seed rerun");
            seed_results.push(SeedResult {
                seed,
                lambda,
                below_threshold: lambda < SEED_THRESHOLD,
            });
        }

        let fixed_seed = self.plan.base_seed;
        let mut fixed = Vec::with_capacity(self.repeats as usize);
        for repeat in 0..self.repeats {
            let lambda = self.measure_lambda(family, fixed_seed).await?;
            debug!(repeat, lambda, "fixed-seed repetition");
            fixed.push(lambda);
        }
        let fixed_statistics = RunStatistics::from_values(fixed);

        let seed_limited = seed_results.iter().any(|r| r.below_threshold);
        let hardware_noisy = fixed_statistics.std > HARDWARE_STD_THRESHOLD;
        let verdict = Verdict::from_flags(seed_limited, hardware_noisy);

        info!(
            ?verdict,
            hardware_std = fixed_statistics.std,
            "variability diagnosis complete"
        );

        Ok(VariabilityReport {
            family,
            seed_results,
            fixed_seed,
            fixed_statistics,
            verdict,
        })
    }

    /// One depth sweep at one seed, reduced to λ.
    async fn measure_lambda(&self, family: DynamicsFamily, seed: u64) -> RunResult<f64> {
        let mut data = Vec::with_capacity(self.plan.depths.len());
        for &depth in &self.plan.depths {
            let spec = EchoSpec::new(family, self.plan.num_qubits, depth)
                .with_seed(seed)
                .with_params(self.plan.params);
            let circuit = spec.build()?;

            let job_id = self.backend.submit(&circuit, self.plan.shots).await?;
            let result = self.backend.wait(&job_id).await?;
            data.push((
                f64::from(depth),
                result.return_probability(self.plan.num_qubits as usize),
            ));
        }
        let fit = fit_decay(&data)?;
        Ok(lambda_normalized(fit.lambda_l, self.plan.t_eff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaelion_adapter_sim::SimulatorBackend;

    fn plan() -> ExperimentPlan {
        ExperimentPlan {
            families: vec![DynamicsFamily::Chaotic],
            depths: vec![1, 2, 4, 6],
            shots: 1024,
            runs: 2,
            ..ExperimentPlan::default()
        }
    }

    #[test]
    fn test_verdict_from_flags() {
        assert_eq!(Verdict::from_flags(true, true), Verdict::Both);
        assert_eq!(Verdict::from_flags(true, false), Verdict::SeedLimited);
        assert_eq!(Verdict::from_flags(false, true), Verdict::HardwareNoise);
        assert_eq!(Verdict::from_flags(false, false), Verdict::Stable);
    }

    #[tokio::test]
    async fn test_study_uses_plan_seeds_by_default() {
        let sim = SimulatorBackend::new().with_seed(3);
        let study = VariabilityStudy::new(&sim, plan()).with_repeats(2);

        let report = study.run(DynamicsFamily::Chaotic).await.unwrap();
        let seeds: Vec<u64> = report.seed_results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![42, 1042]);
        assert_eq!(report.fixed_seed, 42);
        assert_eq!(report.fixed_statistics.num_runs(), 2);
    }

    #[tokio::test]
    async fn test_fixed_seed_is_stable_on_simulator() {
        // Same seed, deterministic evolution: the only spread is shot
        // sampling, far below the hardware threshold.
        let sim = SimulatorBackend::new().with_seed(3);
        let study = VariabilityStudy::new(&sim, plan()).with_repeats(3);

        let report = study.run(DynamicsFamily::Chaotic).await.unwrap();
        assert!(report.fixed_statistics.std < HARDWARE_STD_THRESHOLD);
        assert!(!matches!(
            report.verdict,
            Verdict::HardwareNoise | Verdict::Both
        ));
    }

    #[tokio::test]
    async fn test_custom_seed_list() {
        let sim = SimulatorBackend::new().with_seed(3);
        let study = VariabilityStudy::new(&sim, plan())
            .with_seeds(vec![4042, 5042])
            .with_repeats(2);

        let report = study.run(DynamicsFamily::Chaotic).await.unwrap();
        assert_eq!(report.seed_results.len(), 2);
        assert_eq!(report.seed_results[0].seed, 4042);
    }

    #[tokio::test]
    async fn test_rejects_empty_seed_list() {
        let sim = SimulatorBackend::new();
        let study = VariabilityStudy::new(&sim, plan()).with_seeds(Vec::new());
        assert!(study.run(DynamicsFamily::Chaotic).await.is_err());
    }
}
