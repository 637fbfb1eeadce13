//! Zero-noise extrapolation sweeps.
//!
//! For each depth the echo circuit is run at several noise-amplification
//! factors (CX gates folded as CX·CX·CX and so on), and the measured
//! probabilities are extrapolated linearly back to factor zero. Fitting
//! the extrapolated curve alongside the unamplified one shows how much
//! of the apparent decay is gate noise rather than scrambling.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use kaelion_fit::{
    DecayFit, extrapolate_probability, fit_decay, lambda_normalized,
};
use kaelion_hal::Backend;
use kaelion_otoc::{DynamicsFamily, EchoSpec, fold_cx};

use crate::error::RunResult;
use crate::plan::ExperimentPlan;

/// Noise amplification factors. Factor 1 is the unamplified circuit.
pub const FOLD_FACTORS: [u32; 3] = [1, 2, 3];

/// Measurements at one depth across all fold factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZnePoint {
    /// Forward-evolution depth.
    pub depth: u32,
    /// Echo probability at each fold factor, in [`FOLD_FACTORS`] order.
    pub folded: Vec<f64>,
    /// Probability extrapolated to zero noise, clamped to [0, 1].
    pub extrapolated: f64,
}

impl ZnePoint {
    /// The factor-1 (unamplified) measurement.
    pub fn raw(&self) -> f64 {
        self.folded[0]
    }
}

/// One family's ZNE sweep with raw and mitigated fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZneSummary {
    pub family: DynamicsFamily,
    pub seed: u64,
    pub points: Vec<ZnePoint>,
    /// Fit of the factor-1 curve.
    pub raw_fit: DecayFit,
    /// Fit of the extrapolated curve.
    pub mitigated_fit: DecayFit,
    /// Normalized λ from the raw curve.
    pub raw_lambda: f64,
    /// Normalized λ from the mitigated curve.
    pub mitigated_lambda: f64,
}

/// Drives noise-amplified echo sweeps against a backend.
pub struct ZneRunner<'a> {
    backend: &'a dyn Backend,
    plan: ExperimentPlan,
}

impl<'a> ZneRunner<'a> {
    pub fn new(backend: &'a dyn Backend, plan: ExperimentPlan) -> Self {
        Self { backend, plan }
    }

    /// Run the ZNE sweep for every family in the plan.
    pub async fn run(&self) -> RunResult<Vec<ZneSummary>> {
        self.plan.validate()?;
        let mut summaries = Vec::with_capacity(self.plan.families.len());
        for &family in &self.plan.families {
            summaries.push(self.run_family(family).await?);
        }
        Ok(summaries)
    }

    /// Sweep one family: all depths, all fold factors, one seed.
    #[instrument(skip(self), fields(family = %family))]
    pub async fn run_family(&self, family: DynamicsFamily) -> RunResult<ZneSummary> {
        let seed = self.plan.base_seed;
        let factors: Vec<f64> = FOLD_FACTORS.iter().map(|&f| f64::from(f)).collect();
        let mut points = Vec::with_capacity(self.plan.depths.len());

        for &depth in &self.plan.depths {
            let spec = EchoSpec::new(family, self.plan.num_qubits, depth)
                .with_seed(seed)
                .with_params(self.plan.params);
            let circuit = spec.build()?;

            let mut folded = Vec::with_capacity(FOLD_FACTORS.len());
            for &factor in &FOLD_FACTORS {
                let amplified = fold_cx(&circuit, factor)?;
                let job_id = self.backend.submit(&amplified, self.plan.shots).await?;
                let result = self.backend.wait(&job_id).await?;
                folded.push(result.return_probability(self.plan.num_qubits as usize));
            }

            let extrapolated = extrapolate_probability(&factors, &folded)?;
            debug!(depth, raw = folded[0], extrapolated, "zne point measured");
            points.push(ZnePoint {
                depth,
                folded,
                extrapolated,
            });
        }

        let raw_curve: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (f64::from(p.depth), p.raw()))
            .collect();
        let mitigated_curve: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (f64::from(p.depth), p.extrapolated))
            .collect();

        let raw_fit = fit_decay(&raw_curve)?;
        let mitigated_fit = fit_decay(&mitigated_curve)?;
        let raw_lambda = lambda_normalized(raw_fit.lambda_l, self.plan.t_eff);
        let mitigated_lambda = lambda_normalized(mitigated_fit.lambda_l, self.plan.t_eff);

        info!(seed, raw_lambda, mitigated_lambda, "zne sweep complete");

        Ok(ZneSummary {
            family,
            seed,
            points,
            raw_fit,
            mitigated_fit,
            raw_lambda,
            mitigated_lambda,
        })
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
            runs: 1,
            ..ExperimentPlan::default()
        }
    }

    #[tokio::test]
    async fn test_noiseless_extrapolation_matches_raw() {
        // Folding is an identity on a noiseless simulator, so all fold
        // factors measure the same distribution and the zero-noise
        // intercept sits on the shared value (up to shot noise).
        let sim = SimulatorBackend::new().with_seed(7);
        let runner = ZneRunner::new(&sim, plan());

        let summary = runner.run_family(DynamicsFamily::Chaotic).await.unwrap();
        assert_eq!(summary.points.len(), 4);
        for p in &summary.points {
            assert_eq!(p.folded.len(), FOLD_FACTORS.len());
            assert!((0.0..=1.0).contains(&p.extrapolated));
            assert!((p.extrapolated - p.raw()).abs() < 0.1);
        }
    }

    #[tokio::test]
    async fn test_raw_and_mitigated_lambda_close_without_noise() {
        let sim = SimulatorBackend::new().with_seed(7);
        let runner = ZneRunner::new(&sim, plan());

        let summary = runner.run_family(DynamicsFamily::Chaotic).await.unwrap();
        assert!((0.0..=1.0).contains(&summary.raw_lambda));
        assert!((0.0..=1.0).contains(&summary.mitigated_lambda));
        assert!((summary.raw_lambda - summary.mitigated_lambda).abs() < 0.3);
    }

    #[tokio::test]
    async fn test_run_covers_all_families() {
        let sim = SimulatorBackend::new().with_seed(7);
        let mut p = plan();
        p.families = vec![DynamicsFamily::Integrable, DynamicsFamily::Floquet];
        let runner = ZneRunner::new(&sim, p);

        let summaries = runner.run().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].family, DynamicsFamily::Integrable);
    }
}
