//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust,ignore
//! use stakemint_tck::prelude::*;
//! ```

// Re-export chain types
pub use crate::chain::{
    BlockWarp, ClientError, ExecutionClient, SimulatedChain, SimulatedChainConfig,
};

// Re-export contract and scenario types
pub use crate::config::HarnessConfig;
pub use crate::contract::{require_success, ContractArtifact, ContractHandle};
pub use crate::error::{ensure_eq, HarnessError, HarnessResult};
pub use crate::scenario::Scenario;
pub use crate::token::partner_token_artifact;

// Re-export the oracle
pub use crate::oracle::{
    predict_distribution, Expected, IdentityRegistry, MintAmounts, MintCursor, MintPrediction,
    PartnerLedger, StakeRecord,
};

// Re-export common invariants
pub use crate::invariants::{
    check_contract_holds_stakes, check_partner_cardinality, check_supply_conservation,
};

pub use crate::orchestrator::TestRng;

// Re-export commonly used external types
pub use primitive_types::U256;
pub use stakemint_common::crypto::{Address, KeyPair};
