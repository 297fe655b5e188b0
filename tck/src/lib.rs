//! # StakeMint TCK: verification kit for a staking / minting token
//!
//! Drives a token with delegated staking and round-robin block minting
//! through an [`chain::ExecutionClient`] and checks every observable effect
//! against a local reference model.
//!
//! ## Layout
//!
//! - **chain**: execution client trait, block warping and the in-process
//!   simulated chain
//! - **token**: reference token contract run by the simulated chain
//! - **contract**: artifacts and handles bound to deployed instances
//! - **oracle**: stake ledger mirror, mint cursor, credential registry,
//!   typed expectations and the mint distribution model
//! - **drivers**: admin checks, staking, withdrawal and minting workloads
//! - **invariants**: reusable custody, cardinality and supply checks
//! - **scenario**: phases chained over a single deployment
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stakemint_tck::prelude::*;
//!
//! #[tokio::test]
//! async fn test_mint() {
//!     let config = HarnessConfig::default().with_mint_iterations(100);
//!     let mut scenario = Scenario::simulated(config, 42).await.unwrap();
//!     scenario.stake().await.unwrap();
//!     scenario.mint().await.unwrap();
//! }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: credentials come from a seeded RNG
//! 2. **Sequential**: one transaction per block, awaited in order
//! 3. **Exact**: every amount is a checked 256-bit integer; an overflow fails the run

#![warn(clippy::all)]

/// Execution clients and the simulated chain
pub mod chain;

/// Workload configuration
pub mod config;

/// Deployed contract handles
pub mod contract;

/// Staking, withdrawal and minting workloads
pub mod drivers;

/// Harness error types
pub mod error;

/// Token invariant checkers
pub mod invariants;

/// Reference model of partners and mint distribution
pub mod oracle;

/// Deterministic RNG
pub mod orchestrator;

/// Convenient re-exports for common usage
pub mod prelude;

/// End-to-end scenarios
pub mod scenario;

/// Reference token contract
pub mod token;

pub use orchestrator::TestRng;
pub use scenario::Scenario;

/// TCK version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
