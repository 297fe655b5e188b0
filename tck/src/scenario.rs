//! End-to-end scenarios over one token deployment.
//!
//! A [`Scenario`] owns the contract handle, the workload config and the two
//! treasury addresses. Each phase is a method so tests can chain only the
//! phases they need:
//!
//! ```ignore
//! let mut scenario = Scenario::simulated(HarnessConfig::default(), 7).await?;
//! scenario.check_variables().await?;
//! let outcome = scenario.stake().await?;
//! scenario.mint().await?;
//! ```

use primitive_types::U256;
use stakemint_common::{
    config::BUILD_VERSION,
    crypto::{Address, KeyPair},
};

use crate::{
    chain::{ExecutionClient, SimulatedChain, SimulatedChainConfig},
    config::HarnessConfig,
    contract::{require_success, ContractHandle},
    drivers::{
        check_variable, execute_change_method, expect_failure, expect_success,
        initial_expectations, run_mint_campaign, setter_name, staked_serial, withdraw_all,
        MintReport, StakingDriver, StakingOutcome, WithdrawalReport, CHANGEABLE_GETTERS,
    },
    error::{ensure_eq, HarnessError, HarnessResult},
    oracle::{Expected, PartnerLedger},
    token::partner_token_artifact,
};

pub struct Scenario<C: ExecutionClient> {
    handle: ContractHandle<C>,
    config: HarnessConfig,
    eco_fund: Address,
    wemix: Address,
}

impl Scenario<SimulatedChain> {
    /// Deploy onto a fresh simulated chain seeded with `seed`.
    pub async fn simulated(config: HarnessConfig, seed: u64) -> HarnessResult<Self> {
        let chain = SimulatedChain::new(SimulatedChainConfig::default().with_seed(seed));
        Self::deploy(chain, config).await
    }
}

impl<C: ExecutionClient> Scenario<C> {
    /// Deploy the token with fresh owner and treasury credentials.
    pub async fn deploy(client: C, config: HarnessConfig) -> HarnessResult<Self> {
        let owner_key = client.new_credential();
        let eco_fund = client.new_credential().address();
        let wemix = client.new_credential().address();

        let artifact = partner_token_artifact()?;
        log::info!("stakemint build {}", BUILD_VERSION);
        let handle = ContractHandle::deploy(
            client,
            artifact,
            owner_key,
            vec![eco_fund.into(), wemix.into()],
        )
        .await?;

        Ok(Self {
            handle,
            config,
            eco_fund,
            wemix,
        })
    }

    pub fn handle(&self) -> &ContractHandle<C> {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut ContractHandle<C> {
        &mut self.handle
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn eco_fund(&self) -> Address {
        self.eco_fund
    }

    pub fn wemix(&self) -> Address {
        self.wemix
    }

    /// Compare every getter with the values of a fresh deployment.
    pub async fn check_variables(&self) -> HarnessResult<()> {
        let expectations =
            initial_expectations(self.eco_fund, self.wemix, self.handle.block_deployed());
        for (method, expected) in &expectations {
            check_variable(&self.handle, method, expected).await?;
        }
        log::info!("ok > {} variables match", expectations.len());
        Ok(())
    }

    // A value different from `current` of the same type.
    fn changed_value(&self, current: &Expected) -> HarnessResult<Expected> {
        match current {
            Expected::Address(_) => Ok(self.handle.new_credential().address().into()),
            Expected::Uint(value) => Ok(value.saturating_add(U256::one()).into()),
            other => Err(HarnessError::assertion(
                "changeable variable",
                "address or uint256",
                other,
            )),
        }
    }

    fn initial_value(&self, getter: &str) -> HarnessResult<Expected> {
        initial_expectations(self.eco_fund, self.wemix, self.handle.block_deployed())
            .into_iter()
            .find(|(method, _)| *method == getter)
            .map(|(_, expected)| expected)
            .ok_or_else(|| HarnessError::UnknownMethod(getter.to_string()))
    }

    /// Change every settable variable as owner, then restore it.
    pub async fn check_setters(&mut self) -> HarnessResult<()> {
        for getter in CHANGEABLE_GETTERS {
            let initial = self.initial_value(getter)?;
            let changed = self.changed_value(&initial)?;
            execute_change_method(&mut self.handle, getter, &changed).await?;
            execute_change_method(&mut self.handle, getter, &initial).await?;
            log::info!("ok > {} is changeable", setter_name(getter));
        }
        Ok(())
    }

    /// Non-owners are denied every setter and `transferOwnership`; the owner
    /// can hand ownership over and get it back.
    pub async fn check_owner_access(&mut self) -> HarnessResult<()> {
        let outsider = self.handle.new_credential();
        for getter in CHANGEABLE_GETTERS {
            let value = self.changed_value(&self.initial_value(getter)?)?;
            expect_failure(
                &mut self.handle,
                Some(&outsider),
                &setter_name(getter),
                &[value.to_abi_value()],
                Some("caller is not the owner"),
            )
            .await?;
        }
        expect_failure(
            &mut self.handle,
            Some(&outsider),
            "transferOwnership",
            &[outsider.address().into()],
            Some("caller is not the owner"),
        )
        .await?;

        let owner = self.handle.owner();
        let successor = self.handle.new_credential();
        expect_success(
            &mut self.handle,
            None,
            "transferOwnership",
            &[successor.address().into()],
        )
        .await?;
        let current: Address = self.handle.call("owner", &[]).await?;
        ensure_eq("owner after transfer", successor.address(), current)?;

        expect_success(
            &mut self.handle,
            Some(&successor),
            "transferOwnership",
            &[owner.into()],
        )
        .await?;
        let current: Address = self.handle.call("owner", &[]).await?;
        ensure_eq("owner after transfer back", owner, current)?;
        Ok(())
    }

    /// `stake` needs a prior `addAllowedPartner`; after allowing,
    /// `stakeDelegated` succeeds and `Staked` names partner and payer.
    pub async fn check_allowed_partner(&mut self) -> HarnessResult<U256> {
        let partner: KeyPair = self.handle.new_credential();
        let unit: U256 = self.handle.call("unitStaking", &[]).await?;
        let min_wait: U256 = self.handle.call("minBlockWaitingWithdrawal", &[]).await?;

        let receipt = self
            .handle
            .execute(None, "transfer", &[partner.address().into(), unit.into()])
            .await?;
        require_success(&receipt, "transfer")?;
        expect_failure(
            &mut self.handle,
            Some(&partner),
            "stake",
            &[min_wait.into()],
            Some("not allowed"),
        )
        .await?;

        expect_success(
            &mut self.handle,
            None,
            "addAllowedPartner",
            &[partner.address().into()],
        )
        .await?;
        let receipt = expect_success(
            &mut self.handle,
            None,
            "stakeDelegated",
            &[partner.address().into(), min_wait.into()],
        )
        .await?;

        let logs = self.handle.logs_of(&receipt, "Staked")?;
        let log = logs.last().ok_or_else(|| HarnessError::MissingEvent {
            method: "stakeDelegated".to_string(),
            event: "Staked".to_string(),
        })?;
        let topic_partner = log.topic(1).map(|t| t.to_address()).unwrap_or_default();
        let topic_payer = log.topic(2).map(|t| t.to_address()).unwrap_or_default();
        ensure_eq("Staked partner topic", partner.address(), topic_partner)?;
        ensure_eq("Staked payer topic", self.handle.owner(), topic_payer)?;

        let serial = staked_serial(&self.handle, &receipt, "stakeDelegated")?;
        log::info!("ok > allowed partner staked with serial {}", serial);
        Ok(serial)
    }

    /// Run the self-stake and delegated workloads.
    pub async fn stake(&mut self) -> HarnessResult<StakingOutcome> {
        StakingDriver::new(&mut self.handle, &self.config).run().await
    }

    /// Shorten the lock, stake, then withdraw every record.
    pub async fn withdraw(&mut self) -> HarnessResult<WithdrawalReport> {
        let wait = Expected::from(self.config.withdrawal_wait_override);
        execute_change_method(&mut self.handle, "minBlockWaitingWithdrawal", &wait).await?;

        let outcome = self.stake().await?;
        let mut ledger = PartnerLedger::load_from_contract(&self.handle).await?;
        ensure_eq("ledger size", outcome.ledger.len(), ledger.len())?;

        let report = withdraw_all(
            &mut self.handle,
            &mut ledger,
            &outcome.identities,
            &self.config,
        )
        .await?;

        let partners_number: u64 = self.handle.call("partnersNumber", &[]).await?;
        ensure_eq("partner number after withdrawal", 0, partners_number)?;
        let contract_balance = self.handle.balance_of(&self.handle.address()).await?;
        ensure_eq("contract's balance after withdrawal", U256::zero(), contract_balance)?;

        log::info!(
            "ok > withdrew {} stakes, {} rejected, {} blocks forced",
            report.withdrawn,
            report.rejected,
            report.blocks_forced
        );
        Ok(report)
    }

    /// Run a minting campaign of the configured length.
    pub async fn mint(&mut self) -> HarnessResult<MintReport> {
        run_mint_campaign(&mut self.handle, self.config.mint_iterations).await
    }
}
