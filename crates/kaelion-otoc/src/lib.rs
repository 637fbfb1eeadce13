//! Echo circuit construction for OTOC decay experiments.
//!
//! An echo circuit sandwiches a probe operator W between a forward
//! evolution U and its exact inverse U†, with a butterfly operator V
//! applied before and after. The probability of returning to the
//! all-zeros state, F(d), tracks the out-of-time-order correlator:
//! for scrambling dynamics F(d) decays exponentially in depth d, for
//! non-scrambling dynamics it stays near 1.
//!
//! [`EchoSpec`] describes one circuit (dynamics family, width, depth,
//! seed) and builds it; [`DynamicsFamily`] enumerates the six supported
//! evolution families; [`fold_cx`] produces noise-amplified variants
//! for zero-noise extrapolation.

pub mod echo;
pub mod family;
pub mod folding;

pub use echo::{DEFAULT_SEED, EchoSpec};
pub use family::{DynamicsFamily, FamilyParams};
pub use folding::fold_cx;
