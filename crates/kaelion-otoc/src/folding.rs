//! Noise amplification for zero-noise extrapolation.

use kaelion_ir::{Circuit, InstructionKind, IrResult, StandardGate};

/// Amplify two-qubit noise by folding CX gates.
///
/// After every CX in the input, `factor - 1` identity pairs (CX·CX) are
/// inserted on the same qubits. Factor 1 returns the circuit unchanged;
/// factor k multiplies the CX count by `2k - 1`, scaling the dominant
/// two-qubit error while leaving the ideal unitary untouched.
pub fn fold_cx(circuit: &Circuit, factor: u32) -> IrResult<Circuit> {
    if factor <= 1 {
        return Ok(circuit.clone());
    }

    let mut folded = Circuit::with_size(
        format!("{}_x{}", circuit.name(), factor),
        circuit.num_qubits() as u32,
        circuit.num_clbits() as u32,
    );
    for inst in circuit.instructions() {
        folded.push(inst.clone())?;
        if matches!(inst.kind, InstructionKind::Gate(StandardGate::CX)) {
            for _ in 0..factor - 1 {
                folded.push(inst.clone())?;
                folded.push(inst.clone())?;
            }
        }
    }
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echo::EchoSpec;
    use crate::family::DynamicsFamily;

    fn cx_count(circuit: &Circuit) -> usize {
        circuit
            .instructions()
            .filter(|i| matches!(i.kind, InstructionKind::Gate(StandardGate::CX)))
            .count()
    }

    #[test]
    fn test_factor_one_is_identity() {
        let circuit = EchoSpec::new(DynamicsFamily::Chaotic, 4, 2).build().unwrap();
        let folded = fold_cx(&circuit, 1).unwrap();
        assert_eq!(circuit, folded);
    }

    #[test]
    fn test_cx_count_scales() {
        let circuit = EchoSpec::new(DynamicsFamily::Integrable, 4, 3)
            .build()
            .unwrap();
        let base = cx_count(&circuit);
        assert!(base > 0);

        for factor in [2u32, 3] {
            let folded = fold_cx(&circuit, factor).unwrap();
            assert_eq!(cx_count(&folded), base * (2 * factor as usize - 1));
        }
    }

    #[test]
    fn test_non_cx_gates_untouched() {
        let circuit = EchoSpec::new(DynamicsFamily::KickedIsing, 4, 2)
            .build()
            .unwrap();
        // Kicked Ising uses RZZ, not CX, so folding is a no-op.
        let folded = fold_cx(&circuit, 3).unwrap();
        assert_eq!(folded.num_ops(), circuit.num_ops());
    }
}
