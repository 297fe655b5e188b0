//! Workload configuration for the staking, withdrawal and minting drivers.

use serde::{Deserialize, Serialize};

/// Sizes and caps of a scenario run.
///
/// # Example
/// ```ignore
/// let config = HarnessConfig::default()
///     .with_mint_iterations(200)
///     .with_stake_record_logging();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Partners that fund and sign their own stakes
    pub self_stake_partners: u64,
    /// Partners staked for by the owner
    pub delegated_partners: u64,
    /// Blocks mined (each followed by a `mint`) in a minting campaign
    pub mint_iterations: u64,
    /// `minBlockWaitingWithdrawal` set before a withdrawal workload
    pub withdrawal_wait_override: u64,
    /// Cap on stakes executed for a single partner
    pub max_stakes_per_partner: u64,
    /// Cap on withdrawal passes
    pub max_withdraw_rounds: u64,
    /// Log every stake record fetched after a stake
    pub log_stake_records: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            self_stake_partners: 3,
            delegated_partners: 5,
            mint_iterations: 1000,
            withdrawal_wait_override: 1000,
            max_stakes_per_partner: 64,
            max_withdraw_rounds: 100_000,
            log_stake_records: false,
        }
    }
}

impl HarnessConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }

    pub fn with_self_stake_partners(mut self, count: u64) -> Self {
        self.self_stake_partners = count;
        self
    }

    pub fn with_delegated_partners(mut self, count: u64) -> Self {
        self.delegated_partners = count;
        self
    }

    pub fn with_mint_iterations(mut self, iterations: u64) -> Self {
        self.mint_iterations = iterations;
        self
    }

    pub fn with_withdrawal_wait(mut self, blocks: u64) -> Self {
        self.withdrawal_wait_override = blocks;
        self
    }

    pub fn with_max_stakes_per_partner(mut self, cap: u64) -> Self {
        self.max_stakes_per_partner = cap;
        self
    }

    pub fn with_max_withdraw_rounds(mut self, cap: u64) -> Self {
        self.max_withdraw_rounds = cap;
        self
    }

    pub fn with_stake_record_logging(mut self) -> Self {
        self.log_stake_records = true;
        self
    }
}
