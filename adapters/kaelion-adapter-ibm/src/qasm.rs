//! OpenQASM 3.0 emission.
//!
//! Serializes a circuit to the QASM 3 dialect accepted by the Qiskit
//! Runtime Sampler. Gate names follow `stdgates.inc`; `rzz` is emitted
//! directly since Heron-class devices accept it natively.

use std::fmt::Write;

use kaelion_ir::{Circuit, InstructionKind, StandardGate};

use crate::error::{IbmError, IbmResult};

/// Emit a circuit as an OpenQASM 3.0 program.
pub fn emit(circuit: &Circuit) -> IbmResult<String> {
    let mut out = String::new();
    out.push_str("OPENQASM 3.0;\n");
    out.push_str("include \"stdgates.inc\";\n");

    let nq = circuit.num_qubits();
    let nc = circuit.num_clbits();
    let _ = writeln!(out, "qubit[{nq}] q;");
    if nc > 0 {
        let _ = writeln!(out, "bit[{nc}] c;");
    }

    for inst in circuit.instructions() {
        match &inst.kind {
            InstructionKind::Gate(gate) => emit_gate(&mut out, gate, &inst.qubits)?,
            InstructionKind::Measure => {
                let q = inst.qubits[0].0;
                let c = inst.clbits[0].0;
                let _ = writeln!(out, "c[{c}] = measure q[{q}];");
            }
            InstructionKind::Barrier => {
                out.push_str("barrier q;\n");
            }
        }
    }

    Ok(out)
}

fn emit_gate(
    out: &mut String,
    gate: &StandardGate,
    qubits: &[kaelion_ir::QubitId],
) -> IbmResult<()> {
    let operands = |out: &mut String| {
        let refs: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q.0)).collect();
        out.push_str(&refs.join(", "));
        out.push_str(";\n");
    };

    match *gate {
        StandardGate::I => out.push_str("id "),
        StandardGate::X => out.push_str("x "),
        StandardGate::Y => out.push_str("y "),
        StandardGate::Z => out.push_str("z "),
        StandardGate::H => out.push_str("h "),
        StandardGate::S => out.push_str("s "),
        StandardGate::Sdg => out.push_str("sdg "),
        StandardGate::T => out.push_str("t "),
        StandardGate::Tdg => out.push_str("tdg "),
        StandardGate::Rx(theta) => {
            let _ = write!(out, "rx({theta}) ");
        }
        StandardGate::Ry(theta) => {
            let _ = write!(out, "ry({theta}) ");
        }
        StandardGate::Rz(theta) => {
            let _ = write!(out, "rz({theta}) ");
        }
        StandardGate::U(theta, phi, lambda) => {
            let _ = write!(out, "U({theta}, {phi}, {lambda}) ");
        }
        StandardGate::CX => out.push_str("cx "),
        StandardGate::CZ => out.push_str("cz "),
        StandardGate::Rzz(theta) => {
            let _ = write!(out, "rzz({theta}) ");
        }
    }

    if !theta_params_finite(gate) {
        return Err(IbmError::CircuitConversion(format!(
            "non-finite angle in {} gate",
            gate.name()
        )));
    }

    operands(out);
    Ok(())
}

fn theta_params_finite(gate: &StandardGate) -> bool {
    match *gate {
        StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::Rz(t) | StandardGate::Rzz(t) => {
            t.is_finite()
        }
        StandardGate::U(t, p, l) => t.is_finite() && p.is_finite() && l.is_finite(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaelion_ir::{Circuit, QubitId};
    use kaelion_otoc::{DynamicsFamily, EchoSpec};

    #[test]
    fn test_emit_header_and_registers() {
        let mut c = Circuit::with_size("t", 3, 3);
        c.h(QubitId(0)).unwrap();
        c.measure_all().unwrap();

        let qasm = emit(&c).unwrap();
        assert!(qasm.starts_with("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n"));
        assert!(qasm.contains("qubit[3] q;"));
        assert!(qasm.contains("bit[3] c;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("c[2] = measure q[2];"));
    }

    #[test]
    fn test_emit_parameterized_gates() {
        let mut c = Circuit::with_size("t", 2, 0);
        c.rx(0.5, QubitId(0)).unwrap();
        c.u(1.5, 0.25, 0.0, QubitId(1)).unwrap();
        c.rzz(1.8, QubitId(0), QubitId(1)).unwrap();

        let qasm = emit(&c).unwrap();
        assert!(qasm.contains("rx(0.5) q[0];"));
        assert!(qasm.contains("U(1.5, 0.25, 0) q[1];"));
        assert!(qasm.contains("rzz(1.8) q[0], q[1];"));
    }

    #[test]
    fn test_emit_barrier() {
        let mut c = Circuit::with_size("t", 2, 0);
        c.h(QubitId(0)).unwrap();
        c.barrier_all().unwrap();

        let qasm = emit(&c).unwrap();
        assert!(qasm.contains("barrier q;"));
    }

    #[test]
    fn test_emit_rejects_non_finite_angle() {
        let mut c = Circuit::with_size("t", 1, 0);
        c.rx(f64::NAN, QubitId(0)).unwrap();
        assert!(emit(&c).is_err());
    }

    #[test]
    fn test_echo_circuit_emits() {
        for family in DynamicsFamily::ALL {
            let circuit = EchoSpec::new(family, 4, 2).build().unwrap();
            let qasm = emit(&circuit).unwrap();
            assert!(qasm.contains("qubit[4] q;"), "{family}");
            assert!(qasm.contains("measure"), "{family}");
        }
    }
}
