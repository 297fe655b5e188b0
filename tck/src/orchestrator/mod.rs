//! Deterministic environment helpers.

pub mod rng;

pub use rng::{TestRng, SEED_ENV_VAR};
