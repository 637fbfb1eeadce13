//! Run statistics and bootstrap resampling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::decay::fit_decay;
use crate::error::{FitError, FitResult};

/// Summary statistics over repeated λ measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Per-run λ values, in run order.
    pub values: Vec<f64>,
    /// Mean λ.
    pub mean: f64,
    /// Population standard deviation of λ.
    pub std: f64,
    /// Relative spread std/mean in percent (0 when mean is not positive).
    pub percent_error: f64,
}

impl RunStatistics {
    /// Compute statistics from per-run values.
    pub fn from_values(values: Vec<f64>) -> Self {
        let mean = mean(&values);
        let std = population_std(&values);
        let percent_error = if mean > 0.0 { std / mean * 100.0 } else { 0.0 };
        Self {
            values,
            mean,
            std,
            percent_error,
        }
    }

    /// Number of runs.
    pub fn num_runs(&self) -> usize {
        self.values.len()
    }
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n, matching the reference
/// analysis). Returns 0.0 for fewer than two values.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Bootstrap distribution of λ_L over resampled depth points.
///
/// Draws `resamples` datasets of the same size with replacement, fits
/// each, and collects the λ_L values that converge. The spread of the
/// returned statistics is a confidence estimate that needs no repeated
/// hardware runs.
pub fn bootstrap_lambda(
    data: &[(f64, f64)],
    resamples: usize,
    seed: u64,
) -> FitResult<RunStatistics> {
    if data.len() < 3 {
        return Err(FitError::NotEnoughPoints {
            required: 3,
            actual: data.len(),
        });
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut lambdas = Vec::with_capacity(resamples);

    for _ in 0..resamples {
        let sample: Vec<_> = (0..data.len())
            .map(|_| data[rng.gen_range(0..data.len())])
            .collect();
        // Degenerate resamples (all one depth) fail to fit; skip them.
        if let Ok(fit) = fit_decay(&sample) {
            lambdas.push(fit.lambda_l);
        }
    }

    if lambdas.is_empty() {
        return Err(FitError::Singular);
    }
    Ok(RunStatistics::from_values(lambdas))
}
