//! Readout calibration circuits.

use kaelion_fit::ReadoutCalibration;
use kaelion_hal::Backend;
use kaelion_ir::{Circuit, IrResult, QubitId};

use crate::error::RunResult;

/// Build the all-zeros calibration circuit: prepare |0...0⟩, measure.
pub fn zero_circuit(num_qubits: u32) -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size("cal_zero", num_qubits, num_qubits);
    circuit.measure_all()?;
    Ok(circuit)
}

/// Build the all-ones calibration circuit: X on every qubit, measure.
pub fn one_circuit(num_qubits: u32) -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size("cal_one", num_qubits, num_qubits);
    for q in 0..num_qubits {
        circuit.x(QubitId(q))?;
    }
    circuit.measure_all()?;
    Ok(circuit)
}

/// Measure readout fidelities on a backend.
///
/// Runs both calibration circuits and returns the survival fidelities
/// P(0...0 | prepared 0...0) and P(1...1 | prepared 1...1).
pub async fn calibrate_readout(
    backend: &dyn Backend,
    num_qubits: u32,
    shots: u32,
) -> RunResult<ReadoutCalibration> {
    let n = num_qubits as usize;

    let zero_job = backend.submit(&zero_circuit(num_qubits)?, shots).await?;
    let zero_result = backend.wait(&zero_job).await?;
    let fid_zero = zero_result.return_probability(n);

    let one_job = backend.submit(&one_circuit(num_qubits)?, shots).await?;
    let one_result = backend.wait(&one_job).await?;
    let fid_one = one_result.counts.probability(&"1".repeat(n));

    tracing::info!(fid_zero, fid_one, "readout calibration complete");

    Ok(ReadoutCalibration::new(fid_zero, fid_one))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaelion_adapter_sim::SimulatorBackend;

    #[test]
    fn test_calibration_circuit_structure() {
        let zero = zero_circuit(4).unwrap();
        assert_eq!(zero.num_ops(), 4); // 4 measures, no gates

        let one = one_circuit(4).unwrap();
        assert_eq!(one.num_ops(), 8); // 4 X gates + 4 measures
    }

    #[tokio::test]
    async fn test_noiseless_calibration_is_perfect() {
        let sim = SimulatorBackend::new().with_seed(0);
        let cal = calibrate_readout(&sim, 4, 1024).await.unwrap();

        assert_eq!(cal.fid_zero, 1.0);
        assert_eq!(cal.fid_one, 1.0);
        assert_eq!(cal.correction_factor(), 1.0);
    }
}
