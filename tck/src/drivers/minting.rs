//! Minting campaign and its oracle check.
//!
//! The campaign captures balances and parameters, mines `iterations`
//! blocks each followed by a `mint` from a fresh unfunded account, then
//! replays the credited block range over the ledger with
//! [`predict_distribution`] and compares every balance exactly.

use indexmap::IndexMap;
use primitive_types::U256;
use stakemint_common::crypto::Address;

use crate::{
    chain::ExecutionClient,
    contract::{require_success, ContractHandle},
    error::{ensure_eq, HarnessError, HarnessResult},
    invariants::check_supply_conservation,
    oracle::{predict_distribution, MintAmounts, MintCursor, MintPrediction, PartnerLedger},
};

/// Contract state captured before a campaign.
#[derive(Debug, Clone)]
pub struct MintSnapshot {
    pub ledger: PartnerLedger,
    pub eco_fund: Address,
    pub wemix: Address,
    pub amounts: MintAmounts,
    pub cursor: MintCursor,
    pub block_to_mint: u64,
    pub total_supply: U256,
    /// Balances of every partner and both treasuries
    pub balances: IndexMap<Address, U256>,
}

impl MintSnapshot {
    pub async fn capture<C: ExecutionClient>(handle: &ContractHandle<C>) -> HarnessResult<Self> {
        let ledger = PartnerLedger::load_from_contract(handle).await?;
        let eco_fund: Address = handle.call("ecoFund", &[]).await?;
        let wemix: Address = handle.call("wemix", &[]).await?;

        let mut balances = IndexMap::new();
        for address in ledger
            .distinct_partners()
            .into_iter()
            .chain([eco_fund, wemix])
        {
            if !balances.contains_key(&address) {
                balances.insert(address, handle.balance_of(&address).await?);
            }
        }

        let amounts = MintAmounts {
            partner: handle.call("mintToPartner", &[]).await?,
            eco_fund: handle.call("mintToEcoFund", &[]).await?,
            wemix: handle.call("mintToWemix", &[]).await?,
        };

        Ok(Self {
            ledger,
            eco_fund,
            wemix,
            amounts,
            cursor: MintCursor::new(handle.call("nextPartnerToMint", &[]).await?),
            block_to_mint: handle.call("blockToMint", &[]).await?,
            total_supply: handle.call("totalSupply", &[]).await?,
            balances,
        })
    }

    /// Balances expected after `prediction` is applied.
    ///
    /// # Errors
    /// Returns an assertion error if a balance would exceed 256 bits
    pub fn expected_balances(
        &self,
        prediction: &MintPrediction,
    ) -> HarnessResult<IndexMap<Address, U256>> {
        let mut expected = self.balances.clone();
        let credits = prediction
            .credits_by_address
            .iter()
            .map(|(partner, credit)| (*partner, *credit))
            .chain([
                (self.eco_fund, prediction.eco_fund_credit),
                (self.wemix, prediction.wemix_credit),
            ]);
        for (address, credit) in credits {
            let balance = expected.entry(address).or_default();
            let current = *balance;
            *balance = current.checked_add(credit).ok_or_else(|| {
                HarnessError::assertion(
                    format!("balance of {}", address),
                    format!("{} + {} within 256 bits", current, credit),
                    "overflow",
                )
            })?;
        }
        Ok(expected)
    }
}

/// Outcome of a verified campaign.
#[derive(Debug, Clone)]
pub struct MintReport {
    pub start_block: u64,
    pub end_block: u64,
    pub prediction: MintPrediction,
}

/// Mine `iterations` blocks, each followed by a `mint`, and verify the
/// resulting balances and supply against the reference model.
pub async fn run_mint_campaign<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    iterations: u64,
) -> HarnessResult<MintReport> {
    let snapshot = MintSnapshot::capture(handle).await?;

    for _ in 0..iterations {
        handle.commit_block().await?;
        let key = handle.new_credential();
        let receipt = handle.execute(Some(&key), "mint", &[]).await?;
        require_success(&receipt, "mint")?;
    }

    let end_block: u64 = handle.call("blockToMint", &[]).await?;
    let pending: u64 = handle.call("pendingBlock", &[]).await?;
    if pending != 0 {
        return Err(HarnessError::assertion(
            "pending block is remained",
            0,
            pending,
        ));
    }

    let rounds = end_block.checked_sub(snapshot.block_to_mint).ok_or_else(|| {
        HarnessError::assertion(
            "blockToMint after campaign",
            format!("at least {}", snapshot.block_to_mint),
            end_block,
        )
    })?;
    let prediction =
        predict_distribution(&snapshot.ledger, snapshot.cursor, rounds, &snapshot.amounts)?;

    for (address, expected) in snapshot.expected_balances(&prediction)? {
        let tag = if address == snapshot.eco_fund {
            "ecoFund"
        } else if address == snapshot.wemix {
            "wemix"
        } else {
            "partner"
        };
        let actual = handle.balance_of(&address).await?;
        ensure_eq(format!("{}({}) balance", tag, address), expected, actual)?;
        log::info!(
            "ok > {}({}) balance expected:{}, got:{}",
            tag,
            address,
            expected,
            actual
        );
    }

    let total_supply: U256 = handle.call("totalSupply", &[]).await?;
    check_supply_conservation(snapshot.total_supply, prediction.total_minted, total_supply)?;
    log::info!(
        "ok > match totalSupply and expected totalSupply after mint, got: {}",
        total_supply
    );

    let cursor: u64 = handle.call("nextPartnerToMint", &[]).await?;
    ensure_eq("nextPartnerToMint", prediction.final_cursor.raw(), cursor)?;

    Ok(MintReport {
        start_block: snapshot.block_to_mint,
        end_block,
        prediction,
    })
}
