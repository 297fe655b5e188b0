//! Core invariant checkers
//!
//! Implements token invariants:
//! - Stake custody (the contract holds exactly the staked balances)
//! - Partner cardinality (mirror and contract agree on the record count)
//! - Supply conservation (supply grows only by what `mint` credits)
//! - Stake roles (self-stakes are paid by the partner, delegated ones are not)

use primitive_types::U256;

use crate::{
    error::{HarnessError, HarnessResult},
    oracle::{PartnerLedger, StakeRecord},
};

/// Check stake custody
///
/// The token's own balance must equal the sum of every live stake record.
///
/// # Arguments
/// * `ledger` - Mirrored stake records
/// * `contract_balance` - `balanceOf(contract address)`
///
/// # Errors
/// Returns error if the staked total overflows or differs from the balance
pub fn check_contract_holds_stakes(
    ledger: &PartnerLedger,
    contract_balance: U256,
) -> HarnessResult<()> {
    let staked = ledger.total_staked()?;
    if staked != contract_balance {
        return Err(HarnessError::assertion(
            "contract's balance and total stake balance",
            staked,
            contract_balance,
        ));
    }
    Ok(())
}

/// Check partner cardinality
///
/// # Arguments
/// * `ledger_len` - Records held by the mirror
/// * `partners_number` - `partnersNumber()` reported by the contract
pub fn check_partner_cardinality(ledger_len: usize, partners_number: u64) -> HarnessResult<()> {
    if ledger_len as u64 != partners_number {
        return Err(HarnessError::assertion(
            "partner number",
            ledger_len,
            partners_number,
        ));
    }
    Ok(())
}

/// Check supply conservation across a minting campaign
///
/// # Arguments
/// * `initial` - `totalSupply()` before the campaign
/// * `minted` - Sum of all predicted credits
/// * `actual` - `totalSupply()` after the campaign
///
/// # Errors
/// Returns error if the sum overflows or the supplies differ
pub fn check_supply_conservation(initial: U256, minted: U256, actual: U256) -> HarnessResult<()> {
    let expected = initial.checked_add(minted).ok_or_else(|| {
        HarnessError::assertion("totalSupply", format!("{} + {}", initial, minted), "overflow")
    })?;
    if expected != actual {
        return Err(HarnessError::assertion(
            "totalSupply and expected totalSupply",
            expected,
            actual,
        ));
    }
    Ok(())
}

/// Check that a record's payer matches how it was staked
///
/// # Arguments
/// * `record` - Record read back with `partnerBySerial`
/// * `delegated` - Whether the stake went through `stakeDelegated`
pub fn check_stake_roles(record: &StakeRecord, delegated: bool) -> HarnessResult<()> {
    if record.is_delegated() != delegated {
        let expected = if delegated {
            format!("payer other than {}", record.partner)
        } else {
            format!("payer {}", record.partner)
        };
        return Err(HarnessError::assertion(
            format!("payer of stake {}", record.serial),
            expected,
            record.payer,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakemint_common::crypto::Address;

    fn record(serial: u64, partner: u8, payer: u8, balance: u64) -> StakeRecord {
        StakeRecord {
            serial: U256::from(serial),
            partner: Address::new([partner; 20]),
            payer: Address::new([payer; 20]),
            block_staking: 10,
            block_waiting_withdrawal: 5,
            balance_staking: U256::from(balance),
        }
    }

    #[test]
    fn test_contract_holds_stakes() {
        let mut ledger = PartnerLedger::new();
        ledger.push(record(1, 1, 1, 100)).unwrap();
        ledger.push(record(2, 2, 9, 250)).unwrap();

        assert!(check_contract_holds_stakes(&ledger, U256::from(350u64)).is_ok());
        assert!(check_contract_holds_stakes(&ledger, U256::from(349u64)).is_err());
        assert!(check_contract_holds_stakes(&PartnerLedger::new(), U256::zero()).is_ok());
    }

    #[test]
    fn test_partner_cardinality() {
        assert!(check_partner_cardinality(3, 3).is_ok());
        assert!(check_partner_cardinality(2, 3).is_err());
    }

    #[test]
    fn test_supply_conservation() {
        let initial = U256::from(1_000u64);
        assert!(check_supply_conservation(initial, U256::from(30u64), U256::from(1_030u64)).is_ok());
        assert!(check_supply_conservation(initial, U256::from(30u64), U256::from(1_029u64)).is_err());
        assert!(check_supply_conservation(U256::MAX, U256::one(), U256::MAX).is_err());
    }

    #[test]
    fn test_stake_roles() {
        assert!(check_stake_roles(&record(1, 1, 1, 100), false).is_ok());
        assert!(check_stake_roles(&record(1, 1, 1, 100), true).is_err());
        assert!(check_stake_roles(&record(2, 1, 7, 100), true).is_ok());
        assert!(check_stake_roles(&record(2, 1, 7, 100), false).is_err());
    }
}
