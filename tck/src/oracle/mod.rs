//! Reference model of the contract's staking and minting state.
//!
//! The drivers keep this model in step with what they observe on chain and
//! compare it against the contract after every phase.

mod cursor;
mod distribution;
mod expected;
mod identity;
mod ledger;

pub use cursor::MintCursor;
pub use distribution::{predict_distribution, MintAmounts, MintPrediction};
pub use expected::Expected;
pub use identity::IdentityRegistry;
pub use ledger::{PartnerLedger, StakeRecord};
