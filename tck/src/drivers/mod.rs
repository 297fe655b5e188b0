//! Workload drivers run against a deployed token.

pub mod admin;
pub mod minting;
pub mod staking;
pub mod withdrawal;

pub use admin::{
    check_variable, execute_change_method, expect_failure, expect_success, initial_expectations,
    setter_name, CHANGEABLE_GETTERS,
};
pub use minting::{run_mint_campaign, MintReport, MintSnapshot};
pub use staking::{staked_serial, StakeKind, StakingDriver, StakingOutcome};
pub use withdrawal::{return_balances, try_withdraw, withdraw_all, WithdrawalReport};
