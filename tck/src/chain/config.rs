//! Configuration for the simulated execution environment.

use serde::{Deserialize, Serialize};

use super::block_warp::MAX_WARP_BLOCKS;

/// Configuration for initializing a [`SimulatedChain`](super::SimulatedChain).
///
/// # Example
/// ```ignore
/// let chain = SimulatedChain::new(
///     SimulatedChainConfig::default()
///         .with_seed(42)
///         .with_genesis_height(100),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedChainConfig {
    /// Seed for credential generation (None = `STAKEMINT_TEST_SEED` or random)
    pub seed: Option<u64>,
    /// Maximum number of blocks a single warp may produce
    pub max_warp_blocks: u64,
    /// Height of the genesis block
    pub genesis_height: u64,
}

impl Default for SimulatedChainConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_warp_blocks: MAX_WARP_BLOCKS,
            genesis_height: 0,
        }
    }
}

impl SimulatedChainConfig {
    /// Use a fixed seed for credential generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the warp cap.
    pub fn with_max_warp(mut self, max: u64) -> Self {
        self.max_warp_blocks = max;
        self
    }

    /// Start the chain at `height` instead of zero.
    pub fn with_genesis_height(mut self, height: u64) -> Self {
        self.genesis_height = height;
        self
    }
}
