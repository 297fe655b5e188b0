use indexmap::IndexMap;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use stakemint_common::crypto::Address;

use super::{MintCursor, PartnerLedger};
use crate::error::{HarnessError, HarnessResult};

/// Amounts credited for one minted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAmounts {
    pub partner: U256,
    pub eco_fund: U256,
    pub wemix: U256,
}

/// Expected effect of crediting a number of minted blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintPrediction {
    pub rounds: u64,
    /// Credit count per ledger position
    pub credits_by_index: Vec<u64>,
    /// Amount credited per partner address, first-seen order
    pub credits_by_address: IndexMap<Address, U256>,
    pub eco_fund_credit: U256,
    pub wemix_credit: U256,
    pub total_minted: U256,
    pub final_cursor: MintCursor,
}

impl MintPrediction {
    /// Amount credited to `partner` (zero if never picked).
    pub fn credit_to(&self, partner: &Address) -> U256 {
        self.credits_by_address
            .get(partner)
            .copied()
            .unwrap_or_default()
    }
}

// the token reverts on overflow, so it is never clipped here
fn add_credit(what: &str, acc: U256, amount: U256) -> HarnessResult<U256> {
    acc.checked_add(amount).ok_or_else(|| {
        HarnessError::assertion(
            format!("{} credit", what),
            format!("{} + {} within 256 bits", acc, amount),
            "overflow",
        )
    })
}

/// Replay `rounds` minted blocks over `ledger` starting at `cursor`.
///
/// Each round credits the partner under the cursor (when the ledger is not
/// empty) and both treasuries.
///
/// # Errors
/// Returns an assertion error if any accumulated credit exceeds 256 bits
pub fn predict_distribution(
    ledger: &PartnerLedger,
    cursor: MintCursor,
    rounds: u64,
    amounts: &MintAmounts,
) -> HarnessResult<MintPrediction> {
    let mut cursor = cursor;
    let mut credits_by_index = vec![0u64; ledger.len()];
    let mut credits_by_address: IndexMap<Address, U256> = IndexMap::new();
    let mut eco_fund_credit = U256::zero();
    let mut wemix_credit = U256::zero();
    let mut total_minted = U256::zero();

    for _ in 0..rounds {
        if let Some(index) = cursor.advance(ledger.len()) {
            credits_by_index[index] += 1;
            if let Some(record) = ledger.get_index(index) {
                let credit = credits_by_address.entry(record.partner).or_default();
                *credit = add_credit("partner", *credit, amounts.partner)?;
                total_minted = add_credit("total", total_minted, amounts.partner)?;
            }
        }
        eco_fund_credit = add_credit("ecoFund", eco_fund_credit, amounts.eco_fund)?;
        wemix_credit = add_credit("wemix", wemix_credit, amounts.wemix)?;
        total_minted = add_credit("total", total_minted, amounts.eco_fund)?;
        total_minted = add_credit("total", total_minted, amounts.wemix)?;
    }

    Ok(MintPrediction {
        rounds,
        credits_by_index,
        credits_by_address,
        eco_fund_credit,
        wemix_credit,
        total_minted,
        final_cursor: cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StakeRecord;
    use proptest::prelude::*;

    fn ledger(partners: &[u64]) -> PartnerLedger {
        let mut ledger = PartnerLedger::new();
        for (i, partner) in partners.iter().enumerate() {
            ledger
                .push(StakeRecord {
                    serial: U256::from(i as u64 + 1),
                    partner: Address::from_low_u64(*partner),
                    payer: Address::from_low_u64(*partner),
                    block_staking: 0,
                    block_waiting_withdrawal: 0,
                    balance_staking: U256::one(),
                })
                .unwrap();
        }
        ledger
    }

    fn amounts() -> MintAmounts {
        MintAmounts {
            partner: U256::from(4u64),
            eco_fund: U256::from(2u64),
            wemix: U256::from(1u64),
        }
    }

    #[test]
    fn test_three_partners_seven_rounds() {
        let prediction = predict_distribution(&ledger(&[1, 2, 3]), MintCursor::new(0), 7, &amounts()).unwrap();
        assert_eq!(prediction.credits_by_index, vec![3, 2, 2]);
        // the cursor stays lazily wrapped after the last pick
        assert_eq!(prediction.final_cursor.resolve(3), Some(1));
        assert_eq!(prediction.final_cursor.raw(), 1);
        assert_eq!(prediction.credit_to(&Address::from_low_u64(1)), U256::from(12u64));
        assert_eq!(prediction.total_minted, U256::from(7u64 * 7));
    }

    #[test]
    fn test_repeated_partner_accumulates() {
        let prediction = predict_distribution(&ledger(&[5, 6, 5]), MintCursor::new(1), 3, &amounts()).unwrap();
        assert_eq!(prediction.credits_by_index, vec![1, 1, 1]);
        assert_eq!(prediction.credit_to(&Address::from_low_u64(5)), U256::from(8u64));
        assert_eq!(prediction.final_cursor.raw(), 1);
    }

    #[test]
    fn test_empty_ledger_still_credits_treasuries() {
        let prediction = predict_distribution(&PartnerLedger::new(), MintCursor::new(4), 10, &amounts()).unwrap();
        assert!(prediction.credits_by_address.is_empty());
        assert_eq!(prediction.eco_fund_credit, U256::from(20u64));
        assert_eq!(prediction.wemix_credit, U256::from(10u64));
        assert_eq!(prediction.total_minted, U256::from(30u64));
        assert_eq!(prediction.final_cursor, MintCursor::new(4));
    }

    #[test]
    fn test_stale_cursor_wraps_to_zero() {
        let prediction = predict_distribution(&ledger(&[1, 2]), MintCursor::new(5), 1, &amounts()).unwrap();
        assert_eq!(prediction.credits_by_index, vec![1, 0]);
    }

    #[test]
    fn test_credit_overflow_is_an_error() {
        let huge = MintAmounts {
            partner: U256::MAX / 2,
            ..amounts()
        };
        let err = predict_distribution(&ledger(&[1]), MintCursor::new(0), 3, &huge).unwrap_err();
        assert!(matches!(err, HarnessError::Assertion { ref actual, .. } if actual == "overflow"));

        // two rounds still fit for the partner but not for the total
        assert!(predict_distribution(&ledger(&[1]), MintCursor::new(0), 2, &huge).is_err());
        let quarter = MintAmounts {
            partner: U256::MAX / 4,
            ..amounts()
        };
        assert!(predict_distribution(&ledger(&[1, 2]), MintCursor::new(0), 2, &quarter).is_ok());
    }

    proptest! {
        #[test]
        fn round_robin_coverage(n in 1usize..8, start in 0u64..8, rounds in 0u64..200) {
            let partners: Vec<u64> = (1..=n as u64).collect();
            let cursor = MintCursor::new(start);
            let first = cursor.resolve(n).unwrap_or(0) as u64;
            let prediction = predict_distribution(&ledger(&partners), cursor, rounds, &amounts()).unwrap();

            for i in 0..n {
                let expected = (0..rounds)
                    .filter(|r| ((first + r) % n as u64) as usize == i)
                    .count() as u64;
                prop_assert_eq!(prediction.credits_by_index[i], expected);
            }
        }

        #[test]
        fn total_minted_is_conserved(n in 0usize..6, rounds in 0u64..300) {
            let partners: Vec<u64> = (1..=n as u64).collect();
            let a = amounts();
            let prediction = predict_distribution(&ledger(&partners), MintCursor::default(), rounds, &a).unwrap();

            let partner_total = prediction
                .credits_by_address
                .values()
                .fold(U256::zero(), |acc, v| acc + *v);
            prop_assert_eq!(
                prediction.total_minted,
                partner_total + prediction.eco_fund_credit + prediction.wemix_credit
            );
            let per_round = if n > 0 { a.partner + a.eco_fund + a.wemix } else { a.eco_fund + a.wemix };
            prop_assert_eq!(prediction.total_minted, per_round * U256::from(rounds));
        }
    }
}
