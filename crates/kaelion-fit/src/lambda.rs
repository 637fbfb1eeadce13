//! Normalization of the fitted decay rate.
//!
//! The Maldacena-Shenker-Stanford bound caps the Lyapunov exponent of a
//! thermal system at 2πT. Dividing the fitted λ_L by that bound gives a
//! dimensionless λ in [0, 1]: λ → 1 means the dynamics saturate the
//! bound (maximal scrambling), λ → 0 means no scrambling.

/// Effective temperature used to normalize circuit-depth decay rates.
pub const MSS_TEMPERATURE: f64 = 0.5;

/// The MSS bound 2πT for a given effective temperature.
pub fn mss_bound(t_eff: f64) -> f64 {
    2.0 * std::f64::consts::PI * t_eff
}

/// Normalized λ: the fitted λ_L divided by the MSS bound, clipped to [0, 1].
pub fn lambda_normalized(lambda_l: f64, t_eff: f64) -> f64 {
    (lambda_l / mss_bound(t_eff)).clamp(0.0, 1.0)
}

/// The α(λ) = -0.5 - λ relation.
///
/// α ranges from -0.5 (no scrambling) to -1.5 (bound saturation).
pub fn alpha(lambda: f64) -> f64 {
    -0.5 - lambda
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_mss_bound_at_default_temperature() {
        assert!((mss_bound(MSS_TEMPERATURE) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_lambda_normalization() {
        // λ_L = π at T = 0.5 sits exactly at the bound.
        assert!((lambda_normalized(PI, 0.5) - 1.0).abs() < 1e-12);
        assert!((lambda_normalized(PI / 2.0, 0.5) - 0.5).abs() < 1e-12);
        assert_eq!(lambda_normalized(0.0, 0.5), 0.0);
    }

    #[test]
    fn test_lambda_clipped_to_unit_interval() {
        assert_eq!(lambda_normalized(100.0, 0.5), 1.0);
        assert_eq!(lambda_normalized(-0.3, 0.5), 0.0);
    }

    #[test]
    fn test_alpha_relation() {
        assert!((alpha(0.0) + 0.5).abs() < 1e-12);
        assert!((alpha(1.0) + 1.5).abs() < 1e-12);
        assert!((alpha(0.38) + 0.88).abs() < 1e-12);
    }
}
