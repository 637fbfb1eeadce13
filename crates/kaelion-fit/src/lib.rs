//! Decay fitting and λ extraction for echo experiments.
//!
//! The analysis pipeline this crate implements:
//!
//! 1. [`fit_decay`] fits F(d) = A·exp(-λ_L·d) + B to echo return
//!    probabilities with a bounded Levenberg-Marquardt iteration.
//! 2. [`lambda_normalized`] divides λ_L by the MSS bound 2πT and clips
//!    to [0, 1]; [`alpha`] applies the α(λ) = -0.5 - λ relation.
//! 3. [`RunStatistics`] and [`bootstrap_lambda`] quantify spread across
//!    repeated runs or resampled depth points.
//! 4. [`extrapolate_probability`] and [`ReadoutCalibration`] remove
//!    hardware noise before fitting.

pub mod decay;
pub mod error;
pub mod lambda;
pub mod readout;
pub mod stats;
pub mod zne;

pub use decay::{DecayFit, fit_decay, INITIAL_GUESS, LOWER_BOUNDS, UPPER_BOUNDS};
pub use error::{FitError, FitResult};
pub use lambda::{MSS_TEMPERATURE, alpha, lambda_normalized, mss_bound};
pub use readout::ReadoutCalibration;
pub use stats::{RunStatistics, bootstrap_lambda, mean, population_std};
pub use zne::{extrapolate_probability, extrapolate_to_zero};
