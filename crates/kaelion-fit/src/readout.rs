//! Readout error calibration.
//!
//! Two calibration circuits bracket the readout error: prepare all-zeros
//! and measure, prepare all-ones and measure. The all-zeros fidelity
//! feeds a multiplicative correction for echo return probabilities,
//! since the echo signal is itself a P(all-zeros) measurement.

use serde::{Deserialize, Serialize};

/// Readout fidelities measured by the calibration circuits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutCalibration {
    /// P(0...0 | prepared 0...0).
    pub fid_zero: f64,
    /// P(1...1 | prepared 1...1).
    pub fid_one: f64,
}

impl ReadoutCalibration {
    /// Create a calibration from measured fidelities.
    pub fn new(fid_zero: f64, fid_one: f64) -> Self {
        Self { fid_zero, fid_one }
    }

    /// An identity calibration that applies no correction.
    pub fn ideal() -> Self {
        Self {
            fid_zero: 1.0,
            fid_one: 1.0,
        }
    }

    /// Average readout fidelity across the two preparations.
    pub fn readout_fidelity(&self) -> f64 {
        (self.fid_zero + self.fid_one) / 2.0
    }

    /// Multiplicative correction factor for P(all-zeros) measurements.
    ///
    /// 1/fid_zero when the calibration is credible; a fidelity at or
    /// below 0.5 indicates a broken calibration and disables correction.
    pub fn correction_factor(&self) -> f64 {
        if self.fid_zero > 0.5 {
            1.0 / self.fid_zero
        } else {
            1.0
        }
    }

    /// Apply the correction to a raw probability, capped at 1.
    pub fn correct(&self, raw: f64) -> f64 {
        (raw * self.correction_factor()).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_factor() {
        let cal = ReadoutCalibration::new(0.95, 0.90);
        assert!((cal.correction_factor() - 1.0 / 0.95).abs() < 1e-12);
        assert!((cal.readout_fidelity() - 0.925).abs() < 1e-12);
    }

    #[test]
    fn test_broken_calibration_disables_correction() {
        let cal = ReadoutCalibration::new(0.4, 0.9);
        assert_eq!(cal.correction_factor(), 1.0);
        assert_eq!(cal.correct(0.3), 0.3);
    }

    #[test]
    fn test_correct_caps_at_one() {
        let cal = ReadoutCalibration::new(0.8, 0.8);
        assert_eq!(cal.correct(0.9), 1.0);
        assert!((cal.correct(0.4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ideal_is_identity() {
        let cal = ReadoutCalibration::ideal();
        assert_eq!(cal.correction_factor(), 1.0);
        assert_eq!(cal.correct(0.73), 0.73);
    }
}
