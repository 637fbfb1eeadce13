//! CLI command implementations.

pub mod backends;
pub mod calibrate;
pub mod common;
pub mod fit;
pub mod run;
pub mod variability;
pub mod version;
pub mod zne;
