//! Self-stake and delegated-stake workloads.
//!
//! Every successful stake is mirrored into a [`PartnerLedger`]: the serial
//! comes from the `Staked` event and the full record from a follow-up
//! `partnerBySerial` read.

use primitive_types::U256;
use stakemint_common::{
    crypto::{Address, KeyPair},
    receipt::Receipt,
};

use crate::{
    chain::ExecutionClient,
    config::HarnessConfig,
    contract::{require_success, ContractHandle},
    error::{ensure_eq, HarnessError, HarnessResult},
    invariants::{check_partner_cardinality, check_stake_roles},
    oracle::{IdentityRegistry, PartnerLedger, StakeRecord},
};

/// Who funds a stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeKind {
    /// The partner stakes its own tokens with `stake`
    SelfStake,
    /// A payer stakes on the partner's behalf with `stakeDelegated`
    Delegated,
}

impl StakeKind {
    pub fn method(&self) -> &'static str {
        match self {
            StakeKind::SelfStake => "stake",
            StakeKind::Delegated => "stakeDelegated",
        }
    }
}

/// Result of a staking workload.
#[derive(Debug, Clone)]
pub struct StakingOutcome {
    pub ledger: PartnerLedger,
    /// Credentials of every partner created by the workload
    pub identities: IdentityRegistry,
    pub stakes_executed: u64,
}

/// Serial carried in topic[3] of the `Staked` event of `receipt`.
pub fn staked_serial<C: ExecutionClient>(
    handle: &ContractHandle<C>,
    receipt: &Receipt,
    method: &str,
) -> HarnessResult<U256> {
    let logs = handle.logs_of(receipt, "Staked")?;
    logs.last()
        .and_then(|log| log.topic(3))
        .map(|topic| U256::from_big_endian(topic.as_bytes()))
        .ok_or_else(|| HarnessError::MissingEvent {
            method: method.to_string(),
            event: "Staked".to_string(),
        })
}

/// Drives stakes against a deployed token and keeps the ledger in step.
pub struct StakingDriver<'a, C: ExecutionClient> {
    handle: &'a mut ContractHandle<C>,
    config: &'a HarnessConfig,
    ledger: PartnerLedger,
    identities: IdentityRegistry,
    stakes_executed: u64,
}

impl<'a, C: ExecutionClient> StakingDriver<'a, C> {
    pub fn new(handle: &'a mut ContractHandle<C>, config: &'a HarnessConfig) -> Self {
        Self {
            handle,
            config,
            ledger: PartnerLedger::new(),
            identities: IdentityRegistry::new(),
            stakes_executed: 0,
        }
    }

    pub fn ledger(&self) -> &PartnerLedger {
        &self.ledger
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    fn make_partner(&mut self) -> (Address, KeyPair) {
        let key = self.handle.new_credential();
        let partner = self.identities.insert(key.clone());
        (partner, key)
    }

    /// Allow `partner` once, stake for it with `payer` and record the stake.
    pub async fn stake_once(
        &mut self,
        kind: StakeKind,
        partner: Address,
        payer: &KeyPair,
        wait_block: U256,
    ) -> HarnessResult<StakeRecord> {
        let receipt = self
            .handle
            .execute(None, "addAllowedPartner", &[partner.into()])
            .await?;
        require_success(&receipt, "addAllowedPartner")?;

        let method = kind.method();
        let args = match kind {
            StakeKind::SelfStake => vec![wait_block.into()],
            StakeKind::Delegated => vec![partner.into(), wait_block.into()],
        };
        let receipt = self.handle.execute(Some(payer), method, &args).await?;
        require_success(&receipt, method)?;
        let serial = staked_serial(self.handle, &receipt, method)?;
        self.stakes_executed += 1;

        let record: StakeRecord = self
            .handle
            .call("partnerBySerial", &[serial.into()])
            .await?;
        if self.config.log_stake_records {
            record.log();
        }

        check_stake_roles(&record, kind == StakeKind::Delegated)?;
        ensure_eq("tx sender", payer.address(), record.payer)?;
        ensure_eq("staked partner", partner, record.partner)?;

        self.ledger.push(record.clone())?;
        Ok(record)
    }

    /// Fund a new partner with `unit × (index + 1)` and stake until its
    /// balance is zero.
    pub async fn self_stake(
        &mut self,
        index: u64,
        unit: U256,
        min_wait: U256,
    ) -> HarnessResult<Address> {
        let (partner, key) = self.make_partner();
        let factor = U256::from(index + 1);

        let amount = unit.saturating_mul(factor);
        let receipt = self
            .handle
            .execute(None, "transfer", &[partner.into(), amount.into()])
            .await?;
        require_success(&receipt, "transfer")?;

        let wait_block = min_wait.saturating_mul(factor);
        for _ in 0..self.config.max_stakes_per_partner {
            self.stake_once(StakeKind::SelfStake, partner, &key, wait_block)
                .await?;
            if self.handle.balance_of(&partner).await?.is_zero() {
                return Ok(partner);
            }
        }
        Err(HarnessError::exhausted(
            format!("self-stake of {}", partner),
            self.config.max_stakes_per_partner,
        ))
    }

    /// Stake `unit × (index + 1)` for a new partner from the owner account.
    pub async fn delegated_stake(
        &mut self,
        index: u64,
        unit: U256,
        min_wait: U256,
    ) -> HarnessResult<Address> {
        let (partner, _) = self.make_partner();
        let owner_key = self.handle.owner_key().clone();
        let factor = U256::from(index + 1);

        let mut owed = unit.saturating_mul(factor);
        let wait_block = min_wait.saturating_mul(factor);
        for _ in 0..self.config.max_stakes_per_partner {
            let record = self
                .stake_once(StakeKind::Delegated, partner, &owner_key, wait_block)
                .await?;
            owed = owed.checked_sub(record.balance_staking).ok_or_else(|| {
                HarnessError::assertion(
                    format!("delegated stake for {}", partner),
                    format!("at most {}", owed),
                    record.balance_staking,
                )
            })?;
            if owed.is_zero() {
                return Ok(partner);
            }
        }
        Err(HarnessError::exhausted(
            format!("delegated stake for {}", partner),
            self.config.max_stakes_per_partner,
        ))
    }

    /// Run the configured self-stake and delegated workloads.
    pub async fn run(mut self) -> HarnessResult<StakingOutcome> {
        let unit: U256 = self.handle.call("unitStaking", &[]).await?;
        let min_wait: U256 = self.handle.call("minBlockWaitingWithdrawal", &[]).await?;

        for index in 0..self.config.self_stake_partners {
            self.self_stake(index, unit, min_wait).await?;
        }
        for index in 0..self.config.delegated_partners {
            self.delegated_stake(index, unit, min_wait).await?;
        }

        let partners_number: u64 = self.handle.call("partnersNumber", &[]).await?;
        ensure_eq("partner number", self.stakes_executed, partners_number)?;
        check_partner_cardinality(self.ledger.len(), partners_number)?;

        log::info!(
            "ok > staked {} records for {} partners",
            self.stakes_executed,
            self.identities.len()
        );

        Ok(StakingOutcome {
            ledger: self.ledger,
            identities: self.identities,
            stakes_executed: self.stakes_executed,
        })
    }
}
