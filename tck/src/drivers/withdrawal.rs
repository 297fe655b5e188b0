//! Withdrawal workload with exact eligibility checks.

use primitive_types::U256;
use stakemint_common::crypto::KeyPair;

use crate::{
    chain::ExecutionClient,
    config::HarnessConfig,
    contract::{require_success, ContractHandle},
    error::{HarnessError, HarnessResult},
    invariants::check_contract_holds_stakes,
    oracle::{IdentityRegistry, PartnerLedger, StakeRecord},
};

/// Counters of a finished withdrawal workload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalReport {
    pub withdrawn: u64,
    /// Withdrawal attempts rejected because the stake was still locked
    pub rejected: u64,
    /// Empty blocks forced between passes
    pub blocks_forced: u64,
    /// Tokens transferred back to the owner afterwards
    pub returned: U256,
}

/// Credential allowed to withdraw `record`.
fn payer_key<C: ExecutionClient>(
    handle: &ContractHandle<C>,
    identities: &IdentityRegistry,
    record: &StakeRecord,
) -> HarnessResult<KeyPair> {
    if record.payer == handle.owner() {
        return Ok(handle.owner_key().clone());
    }
    identities.require(&record.payer).cloned()
}

/// Attempt `withdraw(serial)` and check the outcome against the lock.
///
/// Returns whether the withdrawal went through.
pub async fn try_withdraw<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    identities: &IdentityRegistry,
    record: &StakeRecord,
) -> HarnessResult<bool> {
    let key = payer_key(handle, identities, record)?;
    let receipt = handle
        .execute(Some(&key), "withdraw", &[record.serial.into()])
        .await?;
    let block = receipt.block_number;
    let withdrawable_at = record.withdrawable_at();

    match (receipt.is_success(), record.is_withdrawable(block)) {
        (true, true) => {
            log::info!("ok > withdrawal : {}", record.serial);
            Ok(true)
        }
        (false, false) => Ok(false),
        (true, false) => Err(HarnessError::assertion(
            format!("withdrawal of {} at block {}", record.serial, block),
            format!("rejected before block {}", withdrawable_at),
            "accepted",
        )),
        (false, true) => Err(HarnessError::assertion(
            format!("withdrawal of {} at block {}", record.serial, block),
            format!("accepted from block {}", withdrawable_at),
            receipt
                .revert_reason
                .unwrap_or_else(|| "rejected".to_string()),
        )),
    }
}

/// Withdraw every stake in `ledger`, forcing blocks until all locks expire.
///
/// Before the first attempt the contract's own balance must equal the sum
/// of staked balances. Afterwards every registered partner's tokens are
/// sent back to the owner.
pub async fn withdraw_all<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    ledger: &mut PartnerLedger,
    identities: &IdentityRegistry,
    config: &HarnessConfig,
) -> HarnessResult<WithdrawalReport> {
    let contract_balance = handle.balance_of(&handle.address()).await?;
    check_contract_holds_stakes(ledger, contract_balance)?;
    log::info!(
        "ok > contract's balance: {}, total stake balance: {}",
        contract_balance,
        ledger.total_staked()?
    );

    let mut report = WithdrawalReport::default();
    let mut rounds = 0u64;
    while !ledger.is_empty() {
        if rounds >= config.max_withdraw_rounds {
            return Err(HarnessError::exhausted(
                "withdrawal passes",
                config.max_withdraw_rounds,
            ));
        }
        rounds += 1;

        let mut withdrawn = None;
        for index in 0..ledger.len() {
            let Some(record) = ledger.get_index(index).cloned() else {
                break;
            };
            if try_withdraw(handle, identities, &record).await? {
                withdrawn = Some(record.serial);
                break;
            }
            report.rejected += 1;
        }

        match withdrawn {
            // the contract swap-removes the same position
            Some(serial) => {
                ledger.swap_remove(&serial);
                report.withdrawn += 1;
            }
            None => {
                handle.commit_block().await?;
                report.blocks_forced += 1;
            }
        }
    }

    report.returned = return_balances(handle, identities).await?;
    Ok(report)
}

/// Transfer every registered partner's balance back to the owner.
pub async fn return_balances<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    identities: &IdentityRegistry,
) -> HarnessResult<U256> {
    let owner = handle.owner();
    let mut returned = U256::zero();
    for (partner, key) in identities.iter() {
        let balance = handle.balance_of(partner).await?;
        if balance.is_zero() {
            continue;
        }
        let receipt = handle
            .execute(Some(key), "transfer", &[owner.into(), balance.into()])
            .await?;
        require_success(&receipt, "transfer")?;
        returned = returned.saturating_add(balance);
        log::info!("ok > return token to owner");
    }
    Ok(returned)
}
