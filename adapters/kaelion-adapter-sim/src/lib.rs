//! Local statevector simulator backend.
//!
//! Noiseless reference backend for echo experiments. Circuits are
//! evolved once through dense statevector kernels and shots are sampled
//! from the final distribution, so a 4-qubit echo at 100k shots costs
//! one evolution rather than 100k.

pub mod simulator;
pub mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::Statevector;
