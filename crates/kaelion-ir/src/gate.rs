//! Quantum gate types.
//!
//! The gate set is deliberately the closure of what the six OTOC dynamics
//! families emit: Clifford generators, the T gate, single-qubit rotations,
//! the universal U(θ, φ, λ), and the Rzz coupling. Every gate here has a
//! well-defined inverse inside the same set, which is what makes the
//! backward half of the echo circuit constructible.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// ZZ rotation gate.
    Rzz(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Rzz(_) => "rzz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX | StandardGate::CZ | StandardGate::Rzz(_) => 2,
        }
    }

    /// Get the inverse of this gate.
    ///
    /// Every gate in the set inverts within the set:
    /// U(θ, φ, λ)† = U(-θ, -λ, -φ).
    #[must_use]
    pub fn inverse(&self) -> StandardGate {
        match *self {
            StandardGate::I => StandardGate::I,
            StandardGate::X => StandardGate::X,
            StandardGate::Y => StandardGate::Y,
            StandardGate::Z => StandardGate::Z,
            StandardGate::H => StandardGate::H,
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(theta) => StandardGate::Rx(-theta),
            StandardGate::Ry(theta) => StandardGate::Ry(-theta),
            StandardGate::Rz(theta) => StandardGate::Rz(-theta),
            StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),
            StandardGate::CX => StandardGate::CX,
            StandardGate::CZ => StandardGate::CZ,
            StandardGate::Rzz(theta) => StandardGate::Rzz(-theta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::Rzz(1.8).num_qubits(), 2);
        assert_eq!(StandardGate::Rzz(1.8).name(), "rzz");
    }

    #[test]
    fn test_self_inverse_gates() {
        for g in [
            StandardGate::I,
            StandardGate::X,
            StandardGate::Y,
            StandardGate::Z,
            StandardGate::H,
            StandardGate::CX,
            StandardGate::CZ,
        ] {
            assert_eq!(g.inverse(), g);
        }
    }

    #[test]
    fn test_rotation_inverse() {
        assert_eq!(StandardGate::Rx(PI / 4.0).inverse(), StandardGate::Rx(-PI / 4.0));
        assert_eq!(StandardGate::S.inverse(), StandardGate::Sdg);
        assert_eq!(StandardGate::Tdg.inverse(), StandardGate::T);
    }

    #[test]
    fn test_u_inverse_swaps_phases() {
        // U(θ, φ, λ)† = U(-θ, -λ, -φ)
        let g = StandardGate::U(0.3, 1.1, 2.2);
        assert_eq!(g.inverse(), StandardGate::U(-0.3, -2.2, -1.1));
        assert_eq!(g.inverse().inverse(), g);
    }
}
