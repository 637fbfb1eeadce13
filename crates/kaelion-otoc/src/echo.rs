//! Echo circuit construction.
//!
//! The echo protocol measures F(d) = |<0...0|V† U† W U V|0...0>|² as a
//! proxy for the OTOC at depth d:
//!
//! ```text
//!   H(q0) ── V=X(q0) ── U (d layers) ── W=Z(q_{n-1}) ── U† ── V†=X(q0) ── measure
//! ```
//!
//! The backward evolution is the exact gate-level inverse of the forward
//! evolution, so any residual decay of F(d) in a noiseless run comes from
//! the probe W failing to commute through U. Non-scrambling dynamics hold
//! F(d) near its unscrambled baseline while scrambling dynamics drive an
//! exponential decay.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{PI, TAU};

use kaelion_ir::{Circuit, IrResult, QubitId};

use crate::family::{DynamicsFamily, FamilyParams};

/// Default base seed for randomized families.
pub const DEFAULT_SEED: u64 = 42;

/// Specification of one echo circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoSpec {
    /// Forward-evolution dynamics.
    pub family: DynamicsFamily,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Number of forward evolution layers.
    pub depth: u32,
    /// Base seed for randomized families. Ignored by deterministic ones.
    pub seed: u64,
    /// Structured-family parameters.
    pub params: FamilyParams,
}

impl EchoSpec {
    /// Create a spec with the default seed and family parameters.
    pub fn new(family: DynamicsFamily, num_qubits: u32, depth: u32) -> Self {
        Self {
            family,
            num_qubits,
            depth,
            seed: DEFAULT_SEED,
            params: FamilyParams::default(),
        }
    }

    /// Override the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the family parameters.
    pub fn with_params(mut self, params: FamilyParams) -> Self {
        self.params = params;
        self
    }

    /// Effective seed for this depth point.
    ///
    /// Each depth draws from its own stream so the random angles differ
    /// across depth points. Reusing one seed across depths makes chaotic
    /// circuits repeat the same angles and suppresses scrambling.
    pub fn layer_seed(&self) -> u64 {
        self.seed + u64::from(self.depth) * 100
    }

    /// Build the forward evolution U: `depth` layers of this family.
    ///
    /// No state preparation, no measurement. Useful on its own for
    /// inspecting layer structure; `build()` composes the full protocol
    /// around it.
    pub fn forward(&self) -> IrResult<Circuit> {
        let mut circuit = Circuit::with_size(
            format!("{}_fwd_d{}", self.family.id(), self.depth),
            self.num_qubits,
            0,
        );
        let mut rng = SmallRng::seed_from_u64(self.layer_seed());
        for _ in 0..self.depth {
            self.layer(&mut circuit, &mut rng)?;
        }
        Ok(circuit)
    }

    /// Build the complete echo circuit, measurement included.
    pub fn build(&self) -> IrResult<Circuit> {
        let n = self.num_qubits;
        let mut circuit = Circuit::with_size(
            format!("{}_echo_d{}", self.family.id(), self.depth),
            n,
            n,
        );

        // State preparation and butterfly operator V = X.
        circuit.h(QubitId(0))?;
        circuit.barrier_all()?;
        circuit.x(QubitId(0))?;
        circuit.barrier_all()?;

        let forward = self.forward()?;
        circuit.compose(&forward)?;
        circuit.barrier_all()?;

        // Probe operator W = Z on the far qubit.
        circuit.z(QubitId(n - 1))?;
        circuit.barrier_all()?;

        // Exact gate-level inverse of the forward evolution.
        circuit.compose(&forward.inverse()?)?;
        circuit.barrier_all()?;

        // V† = X, then read out every qubit.
        circuit.x(QubitId(0))?;
        circuit.measure_all()?;

        Ok(circuit)
    }

    /// Append one layer of this family's dynamics.
    fn layer(&self, circuit: &mut Circuit, rng: &mut SmallRng) -> IrResult<()> {
        let n = self.num_qubits;
        let p = &self.params;
        match self.family {
            DynamicsFamily::Chaotic => {
                for i in 0..n {
                    let theta = rng.gen_range(0.0..TAU);
                    let phi = rng.gen_range(0.0..TAU);
                    circuit.u(theta, phi, 0.0, QubitId(i))?;
                }
                for i in 0..n - 1 {
                    circuit.cx(QubitId(i), QubitId(i + 1))?;
                }
                // Ring closure spreads the operator front in both directions.
                circuit.cx(QubitId(n - 1), QubitId(0))?;
            }
            DynamicsFamily::Integrable => {
                for i in 0..n {
                    circuit.h(QubitId(i))?;
                }
                for i in 0..n - 1 {
                    circuit.cx(QubitId(i), QubitId(i + 1))?;
                }
            }
            DynamicsFamily::Intermediate => {
                for i in 0..n {
                    circuit.h(QubitId(i))?;
                    circuit.t(QubitId(i))?;
                }
                for i in 0..n - 1 {
                    circuit.cx(QubitId(i), QubitId(i + 1))?;
                }
            }
            DynamicsFamily::KickedIsing => {
                for i in 0..n {
                    circuit.rx(2.0 * p.ising_h, QubitId(i))?;
                }
                for i in 0..n - 1 {
                    circuit.rzz(2.0 * p.ising_j, QubitId(i), QubitId(i + 1))?;
                }
                // Rzz is symmetric, so at n == 2 the closure would repeat
                // the (0, 1) coupling and double the effective J.
                if n > 2 {
                    circuit.rzz(2.0 * p.ising_j, QubitId(n - 1), QubitId(0))?;
                }
            }
            DynamicsFamily::Floquet => {
                for i in 0..n {
                    circuit.rx(2.0 * p.floquet_theta, QubitId(i))?;
                    circuit.ry(2.0 * p.floquet_phi, QubitId(i))?;
                }
                for i in 0..n - 1 {
                    circuit.rzz(2.0 * p.floquet_j, QubitId(i), QubitId(i + 1))?;
                }
                if n > 2 {
                    circuit.rzz(2.0 * p.floquet_j, QubitId(n - 1), QubitId(0))?;
                }
                for i in (0..n - 1).step_by(2) {
                    circuit.cz(QubitId(i), QubitId(i + 1))?;
                }
            }
            DynamicsFamily::Syk => {
                for i in 0..n {
                    let theta = rng.gen_range(0.0..PI);
                    let phi = rng.gen_range(0.0..TAU);
                    circuit.u(theta, phi, 0.0, QubitId(i))?;
                }
                // All-to-all random couplings approximate SYK disorder.
                for i in 0..n {
                    for j in (i + 1)..n {
                        let j_ij = rng.gen_range(p.syk_j_min..p.syk_j_max);
                        circuit.rzz(2.0 * j_ij, QubitId(i), QubitId(j))?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaelion_ir::{InstructionKind, StandardGate};

    fn gate_ops(circuit: &Circuit) -> Vec<&'static str> {
        circuit
            .instructions()
            .filter(|i| i.is_gate())
            .map(|i| i.name())
            .collect()
    }

    #[test]
    fn test_echo_structure() {
        let spec = EchoSpec::new(DynamicsFamily::Integrable, 4, 2);
        let circuit = spec.build().unwrap();

        let ops = gate_ops(&circuit);
        assert_eq!(ops[0], "h");
        assert_eq!(ops[1], "x");
        assert_eq!(*ops.last().unwrap(), "x");

        // H + X + forward + Z + backward + X + 4 measures
        let forward_ops = spec.forward().unwrap().num_ops();
        assert_eq!(circuit.num_ops(), 2 * forward_ops + 4 + 4);
    }

    #[test]
    fn test_probe_operator_on_far_qubit() {
        let spec = EchoSpec::new(DynamicsFamily::Integrable, 4, 1);
        let circuit = spec.build().unwrap();

        let z_inst = circuit
            .instructions()
            .find(|i| matches!(i.kind, InstructionKind::Gate(StandardGate::Z)))
            .unwrap();
        assert_eq!(z_inst.qubits, vec![QubitId(3)]);
    }

    #[test]
    fn test_seeded_build_is_deterministic() {
        let spec = EchoSpec::new(DynamicsFamily::Chaotic, 4, 6);
        assert_eq!(spec.build().unwrap(), spec.build().unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = EchoSpec::new(DynamicsFamily::Chaotic, 4, 6);
        let b = a.with_seed(1042);
        assert_ne!(a.build().unwrap(), b.build().unwrap());
    }

    #[test]
    fn test_depth_offsets_seed_stream() {
        let d1 = EchoSpec::new(DynamicsFamily::Syk, 4, 1);
        let d2 = EchoSpec::new(DynamicsFamily::Syk, 4, 2);
        assert_eq!(d1.layer_seed(), 142);
        assert_eq!(d2.layer_seed(), 242);

        // First layer angles must differ between depth points.
        let first = |spec: &EchoSpec| {
            spec.forward()
                .unwrap()
                .instructions()
                .next()
                .cloned()
                .unwrap()
        };
        assert_ne!(first(&d1), first(&d2));
    }

    #[test]
    fn test_deterministic_family_ignores_seed() {
        let a = EchoSpec::new(DynamicsFamily::KickedIsing, 4, 4);
        let b = a.with_seed(9999);
        assert_eq!(a.build().unwrap(), b.build().unwrap());
    }

    #[test]
    fn test_forward_layer_counts() {
        let n = 4u32;
        // n single-qubit U + (n-1) chain CX + 1 ring CX per layer.
        let spec = EchoSpec::new(DynamicsFamily::Chaotic, n, 3);
        assert_eq!(spec.forward().unwrap().num_ops(), 3 * (4 + 3 + 1));

        // SYK: n rotations + n(n-1)/2 couplings per layer.
        let spec = EchoSpec::new(DynamicsFamily::Syk, n, 2);
        assert_eq!(spec.forward().unwrap().num_ops(), 2 * (4 + 6));
    }

    #[test]
    fn test_two_qubit_ring_not_doubled() {
        // The single qubit pair carries its coupling once per layer;
        // a ring closure on top of the chain would double J.
        let rzz_count = |family| {
            EchoSpec::new(family, 2, 1)
                .forward()
                .unwrap()
                .instructions()
                .filter(|i| matches!(i.kind, InstructionKind::Gate(StandardGate::Rzz(_))))
                .count()
        };
        assert_eq!(rzz_count(DynamicsFamily::KickedIsing), 1);
        assert_eq!(rzz_count(DynamicsFamily::Floquet), 1);
        assert_eq!(rzz_count(DynamicsFamily::Syk), 1);

        // Three qubits close the ring: chain (0,1), (1,2) plus (2,0).
        assert_eq!(
            EchoSpec::new(DynamicsFamily::KickedIsing, 3, 1)
                .forward()
                .unwrap()
                .instructions()
                .filter(|i| matches!(i.kind, InstructionKind::Gate(StandardGate::Rzz(_))))
                .count(),
            3
        );
    }

    #[test]
    fn test_backward_is_exact_inverse() {
        let spec = EchoSpec::new(DynamicsFamily::Floquet, 4, 2);
        let forward = spec.forward().unwrap();
        let backward = forward.inverse().unwrap();

        let fwd: Vec<_> = forward.instructions().collect();
        let bwd: Vec<_> = backward.instructions().collect();
        assert_eq!(fwd.len(), bwd.len());

        // Last forward gate inverts to first backward gate.
        let last = fwd.last().unwrap();
        let first = bwd.first().unwrap();
        assert_eq!(last.qubits, first.qubits);
        if let (InstructionKind::Gate(g), InstructionKind::Gate(ginv)) =
            (&last.kind, &first.kind)
        {
            assert_eq!(g.inverse(), *ginv);
        } else {
            panic!("expected gates");
        }
    }

    #[test]
    fn test_every_family_builds() {
        for family in DynamicsFamily::ALL {
            for depth in [1, 2, 4, 6, 8, 10, 14] {
                let spec = EchoSpec::new(family, 4, depth);
                let circuit = spec.build().unwrap();
                assert!(circuit.num_ops() > 0, "{family} d={depth}");
                assert_eq!(circuit.num_qubits(), 4);
                assert_eq!(circuit.num_clbits(), 4);
            }
        }
    }
}
