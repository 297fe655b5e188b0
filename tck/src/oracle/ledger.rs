use indexmap::{IndexMap, IndexSet};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use stakemint_common::{
    abi::{field, AbiError, AbiValue, FromAbiValues},
    crypto::Address,
};

use crate::{
    chain::ExecutionClient,
    contract::ContractHandle,
    error::{HarnessError, HarnessResult},
};

/// One stake as registered by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub serial: U256,
    /// Beneficiary of minting
    pub partner: Address,
    /// Account that funded the stake (equals `partner` for self-stake)
    pub payer: Address,
    pub block_staking: u64,
    pub block_waiting_withdrawal: u64,
    pub balance_staking: U256,
}

impl StakeRecord {
    /// First block at which a withdrawal of this stake succeeds.
    pub fn withdrawable_at(&self) -> u64 {
        self.block_staking
            .saturating_add(self.block_waiting_withdrawal)
    }

    pub fn is_withdrawable(&self, height: u64) -> bool {
        height >= self.withdrawable_at()
    }

    pub fn is_delegated(&self) -> bool {
        self.payer != self.partner
    }

    /// Log the record at info level.
    pub fn log(&self) {
        log::info!("Partner:{} serial:{}", self.partner, self.serial);
        log::info!(" -Payer:{}", self.payer);
        log::info!(" -BalanceStaking:{}", self.balance_staking);
        log::info!(" -BlockStaking:{}", self.block_staking);
        log::info!(" -BlockWaitingWithdrawal:{}", self.block_waiting_withdrawal);
    }
}

/// Decodes the six-value tuple returned by `partnerBySerial` and
/// `partnerByIndex`.
impl FromAbiValues for StakeRecord {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        if values.len() != 6 {
            return Err(AbiError::ArityMismatch {
                context: "stake record".to_string(),
                expected: 6,
                got: values.len(),
            });
        }
        Ok(Self {
            serial: field(&values, 0)?,
            partner: field(&values, 1)?,
            payer: field(&values, 2)?,
            block_staking: field(&values, 3)?,
            block_waiting_withdrawal: field(&values, 4)?,
            balance_staking: field(&values, 5)?,
        })
    }
}

/// Reference copy of the contract's partner list.
///
/// Indexed both by serial and by insertion position; positions follow the
/// contract's registration order, including its swap-remove on withdrawal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerLedger {
    records: IndexMap<U256, StakeRecord>,
}

impl PartnerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from `partnersNumber` and `partnerByIndex`.
    pub async fn load_from_contract<C: ExecutionClient>(
        handle: &ContractHandle<C>,
    ) -> HarnessResult<Self> {
        let count: u64 = handle.call("partnersNumber", &[]).await?;
        let mut ledger = Self::new();
        for index in 0..count {
            let record: StakeRecord = handle.call("partnerByIndex", &[index.into()]).await?;
            ledger.push(record)?;
        }
        log::info!("ok > loadAllStake, partners number: {}", ledger.len());
        Ok(ledger)
    }

    /// Append a record; serials are unique.
    pub fn push(&mut self, record: StakeRecord) -> HarnessResult<()> {
        if self.records.contains_key(&record.serial) {
            return Err(HarnessError::assertion(
                "ledger push",
                "unused serial",
                format!("duplicate serial {}", record.serial),
            ));
        }
        self.records.insert(record.serial, record);
        Ok(())
    }

    pub fn get(&self, serial: &U256) -> Option<&StakeRecord> {
        self.records.get(serial)
    }

    /// Record at insertion position `index`.
    pub fn get_index(&self, index: usize) -> Option<&StakeRecord> {
        self.records.get_index(index).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StakeRecord> {
        self.records.values()
    }

    /// Remove `serial`, moving the last record into its position.
    pub fn swap_remove(&mut self, serial: &U256) -> Option<StakeRecord> {
        self.records.swap_remove(serial)
    }

    /// Sum of `balance_staking` over all records.
    ///
    /// # Errors
    /// Returns an assertion error if the sum exceeds 256 bits
    pub fn total_staked(&self) -> HarnessResult<U256> {
        self.iter().try_fold(U256::zero(), |acc, r| {
            acc.checked_add(r.balance_staking).ok_or_else(|| {
                HarnessError::assertion("total stake balance", "a 256-bit sum", "overflow")
            })
        })
    }

    /// Partner addresses in first-seen order.
    pub fn distinct_partners(&self) -> Vec<Address> {
        self.iter()
            .map(|r| r.partner)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }
}
