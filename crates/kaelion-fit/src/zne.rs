//! Zero-noise extrapolation.

use crate::error::{FitError, FitResult};

/// Extrapolate a measured value to zero noise.
///
/// Fits y = m·f + c by ordinary least squares over (noise factor, value)
/// pairs and returns the intercept c, the model's prediction at factor 0.
pub fn extrapolate_to_zero(factors: &[f64], values: &[f64]) -> FitResult<f64> {
    if factors.len() != values.len() {
        return Err(FitError::LengthMismatch {
            left: factors.len(),
            right: values.len(),
        });
    }
    if factors.len() < 2 {
        return Err(FitError::NotEnoughPoints {
            required: 2,
            actual: factors.len(),
        });
    }

    let n = factors.len() as f64;
    let sum_x: f64 = factors.iter().sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = factors.iter().zip(values).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = factors.iter().map(|x| x * x).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return Err(FitError::Singular);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    Ok(intercept)
}

/// Extrapolate one depth point to zero noise, clamped to [0, 1].
///
/// Extrapolation can overshoot the physical probability range; clamping
/// keeps the decay fit over ZNE data well posed.
pub fn extrapolate_probability(factors: &[f64], values: &[f64]) -> FitResult<f64> {
    Ok(extrapolate_to_zero(factors, values)?.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_extrapolation() {
        // y = 0.9 - 0.1 f: intercept 0.9.
        let factors = [1.0, 2.0, 3.0];
        let values = [0.8, 0.7, 0.6];
        let zero = extrapolate_to_zero(&factors, &values).unwrap();
        assert!((zero - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolation_clamps_overshoot() {
        // Steep noise slope extrapolates above 1.
        let factors = [1.0, 2.0, 3.0];
        let values = [0.9, 0.6, 0.3];
        let raw = extrapolate_to_zero(&factors, &values).unwrap();
        assert!(raw > 1.0);
        let clamped = extrapolate_probability(&factors, &values).unwrap();
        assert_eq!(clamped, 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = extrapolate_to_zero(&[1.0, 2.0], &[0.5]).unwrap_err();
        assert!(matches!(err, FitError::LengthMismatch { left: 2, right: 1 }));
    }

    #[test]
    fn test_identical_factors_singular() {
        let err = extrapolate_to_zero(&[2.0, 2.0], &[0.5, 0.6]).unwrap_err();
        assert!(matches!(err, FitError::Singular));
    }

    #[test]
    fn test_too_few_points() {
        let err = extrapolate_to_zero(&[1.0], &[0.5]).unwrap_err();
        assert!(matches!(err, FitError::NotEnoughPoints { required: 2, .. }));
    }
}
