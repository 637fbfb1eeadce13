//! Exponential decay fitting.
//!
//! Fits F(d) = A · exp(-λ_L · d) + B to (depth, probability) pairs with
//! a damped Gauss-Newton (Levenberg-Marquardt) iteration. Parameters
//! are kept inside box bounds by projection after each step:
//!
//! ```text
//!   A   ∈ [0, 2]      amplitude
//!   λ_L ∈ [0, 5]      Lyapunov exponent (per layer)
//!   B   ∈ [-0.5, 0.5] noise floor offset
//! ```
//!
//! The starting point [1.0, 0.3, 0.0] reflects an unscrambled circuit:
//! full amplitude, slow decay, no offset.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, FitResult};

/// Lower parameter bounds [A, λ_L, B].
pub const LOWER_BOUNDS: [f64; 3] = [0.0, 0.0, -0.5];
/// Upper parameter bounds [A, λ_L, B].
pub const UPPER_BOUNDS: [f64; 3] = [2.0, 5.0, 0.5];
/// Initial guess [A, λ_L, B].
pub const INITIAL_GUESS: [f64; 3] = [1.0, 0.3, 0.0];

const MAX_ITERATIONS: usize = 200;
const SSE_TOLERANCE: f64 = 1e-12;

/// Result of fitting the decay model to echo data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayFit {
    /// Amplitude A.
    pub amplitude: f64,
    /// Lyapunov exponent λ_L (decay rate per layer).
    pub lambda_l: f64,
    /// Noise floor offset B.
    pub offset: f64,
    /// Standard error of λ_L from the fit covariance.
    pub lambda_stderr: f64,
    /// Residual sum of squares at the solution.
    pub sse: f64,
}

impl DecayFit {
    /// Evaluate the fitted model at depth `d`.
    pub fn evaluate(&self, d: f64) -> f64 {
        model(&[self.amplitude, self.lambda_l, self.offset], d)
    }
}

fn model(p: &[f64; 3], d: f64) -> f64 {
    p[0] * (-p[1] * d).exp() + p[2]
}

/// Jacobian row of the model at depth `d`: [∂/∂A, ∂/∂λ, ∂/∂B].
fn jacobian_row(p: &[f64; 3], d: f64) -> [f64; 3] {
    let e = (-p[1] * d).exp();
    [e, -p[0] * d * e, 1.0]
}

fn sse(p: &[f64; 3], data: &[(f64, f64)]) -> f64 {
    data.iter()
        .map(|&(d, y)| {
            let r = y - model(p, d);
            r * r
        })
        .sum()
}

fn clamp_params(p: &mut [f64; 3]) {
    for i in 0..3 {
        p[i] = p[i].clamp(LOWER_BOUNDS[i], UPPER_BOUNDS[i]);
    }
}

/// Solve a 3x3 linear system by Gaussian elimination with partial pivoting.
fn solve3(mut m: [[f64; 3]; 3], mut rhs: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3)
            .max_by(|&a, &b| {
                m[a][col]
                    .abs()
                    .partial_cmp(&m[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if m[pivot][col].abs() < 1e-300 {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..3 {
            let f = m[row][col] / m[col][col];
            for k in col..3 {
                m[row][k] -= f * m[col][k];
            }
            rhs[row] -= f * rhs[col];
        }
    }

    let mut x = [0.0; 3];
    for col in (0..3).rev() {
        let mut acc = rhs[col];
        for k in col + 1..3 {
            acc -= m[col][k] * x[k];
        }
        x[col] = acc / m[col][col];
    }
    Some(x)
}

/// Invert a 3x3 matrix by solving against the identity columns.
fn invert3(m: [[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let mut inv = [[0.0; 3]; 3];
    for col in 0..3 {
        let mut e = [0.0; 3];
        e[col] = 1.0;
        let x = solve3(m, e)?;
        for row in 0..3 {
            inv[row][col] = x[row];
        }
    }
    Some(inv)
}

/// Fit the decay model to (depth, probability) pairs.
///
/// Needs at least 3 points (one per parameter). Depth values are the
/// number of forward layers; probabilities are echo return probabilities
/// in `[0, 1]` (ZNE-extrapolated values are clamped there upstream).
pub fn fit_decay(data: &[(f64, f64)]) -> FitResult<DecayFit> {
    if data.len() < 3 {
        return Err(FitError::NotEnoughPoints {
            required: 3,
            actual: data.len(),
        });
    }
    for (i, &(d, y)) in data.iter().enumerate() {
        if !d.is_finite() || !y.is_finite() {
            return Err(FitError::NonFiniteData(i));
        }
    }

    let mut p = INITIAL_GUESS;
    let mut damping = 1e-3;
    let mut current_sse = sse(&p, data);

    for _ in 0..MAX_ITERATIONS {
        // Normal equations JᵀJ δ = Jᵀr at the current point.
        let mut jtj = [[0.0; 3]; 3];
        let mut jtr = [0.0; 3];
        for &(d, y) in data {
            let row = jacobian_row(&p, d);
            let r = y - model(&p, d);
            for i in 0..3 {
                jtr[i] += row[i] * r;
                for j in 0..3 {
                    jtj[i][j] += row[i] * row[j];
                }
            }
        }

        // Damped step, retried with stronger damping until SSE improves.
        let mut stepped = false;
        for _ in 0..12 {
            let mut damped = jtj;
            for i in 0..3 {
                damped[i][i] += damping * jtj[i][i].max(1e-12);
            }
            let Some(delta) = solve3(damped, jtr) else {
                return Err(FitError::Singular);
            };

            let mut candidate = [p[0] + delta[0], p[1] + delta[1], p[2] + delta[2]];
            clamp_params(&mut candidate);
            let candidate_sse = sse(&candidate, data);

            if candidate_sse <= current_sse {
                let improvement = current_sse - candidate_sse;
                p = candidate;
                current_sse = candidate_sse;
                damping = (damping / 3.0).max(1e-12);
                stepped = true;
                if improvement < SSE_TOLERANCE {
                    return finish(&p, current_sse, data);
                }
                break;
            }
            damping *= 10.0;
        }

        if !stepped {
            break;
        }
    }

    finish(&p, current_sse, data)
}

fn finish(p: &[f64; 3], final_sse: f64, data: &[(f64, f64)]) -> FitResult<DecayFit> {
    // Covariance estimate: σ² (JᵀJ)⁻¹ with σ² = SSE / (n - 3).
    let mut jtj = [[0.0; 3]; 3];
    for &(d, _) in data {
        let row = jacobian_row(p, d);
        for i in 0..3 {
            for j in 0..3 {
                jtj[i][j] += row[i] * row[j];
            }
        }
    }

    let dof = data.len().saturating_sub(3);
    let lambda_stderr = if dof > 0 {
        let sigma2 = final_sse / dof as f64;
        invert3(jtj)
            .map(|inv| (sigma2 * inv[1][1]).max(0.0).sqrt())
            .unwrap_or(f64::NAN)
    } else {
        // Exactly determined fit, no residual degrees of freedom.
        0.0
    };

    Ok(DecayFit {
        amplitude: p[0],
        lambda_l: p[1],
        offset: p[2],
        lambda_stderr,
        sse: final_sse,
    })
}
