//! Kaelion Circuit Intermediate Representation
//!
//! Core data structures for representing the echo circuits used in OTOC
//! decay experiments. Circuits are ordered instruction lists; the experiment
//! protocols never need compiler passes, but they do need one operation a
//! graph IR makes awkward: exact algebraic inversion of the forward
//! evolution, which is what [`Circuit::inverse`] provides.
//!
//! # Core Components
//!
//! - **Qubits and classical bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`], the gate set the OTOC protocols draw from
//! - **Instructions**: [`Instruction`] combining operations with operands
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: a minimal echo skeleton
//!
//! ```rust
//! use kaelion_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("echo", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.x(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.z(QubitId(1)).unwrap();
//!
//! // Undo the forward evolution exactly.
//! let back = circuit.inverse().unwrap();
//! assert_eq!(back.num_ops(), circuit.num_ops());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
