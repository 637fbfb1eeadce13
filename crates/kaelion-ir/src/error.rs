//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit out of range for this circuit.
    #[error("Qubit {qubit} out of range for circuit with {num_qubits} qubits (gate: {gate_name})")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits in the circuit.
        num_qubits: u32,
        /// Gate name for context.
        gate_name: &'static str,
    },

    /// Classical bit out of range for this circuit.
    #[error("Classical bit {clbit} out of range for circuit with {num_clbits} bits")]
    ClbitOutOfRange {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Number of classical bits in the circuit.
        num_clbits: u32,
    },

    /// Duplicate qubit in a multi-qubit operation.
    #[error("Duplicate qubit {qubit} in operation (gate: {gate_name})")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate name for context.
        gate_name: &'static str,
    },

    /// Circuit contains an instruction with no inverse.
    #[error("Cannot invert circuit '{circuit}': instruction '{instruction}' is not invertible")]
    NotInvertible {
        /// Circuit name.
        circuit: String,
        /// Name of the non-invertible instruction.
        instruction: &'static str,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
