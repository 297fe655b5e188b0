//! Getter checks, owner setters and access-control expectations.

use primitive_types::U256;
use stakemint_common::{
    abi::AbiValue,
    config::{
        INITIAL_SUPPLY, MAX_TIMES_MINTING_ONCE, MINT_TO_ECO_FUND, MINT_TO_PARTNER, MINT_TO_WEMIX,
        MIN_BLOCK_WAITING_WITHDRAWAL, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL, UNIT_STAKING,
    },
    crypto::{Address, KeyPair},
    receipt::Receipt,
};

use crate::{
    chain::ExecutionClient,
    contract::{require_success, ContractHandle},
    error::{HarnessError, HarnessResult},
    oracle::Expected,
};

/// Getters that have an owner-only `change_` setter.
pub const CHANGEABLE_GETTERS: [&str; 8] = [
    "unitStaking",
    "minBlockWaitingWithdrawal",
    "maxTimesMintingOnce",
    "ecoFund",
    "wemix",
    "mintToPartner",
    "mintToEcoFund",
    "mintToWemix",
];

/// Name of the setter for `getter`.
pub fn setter_name(getter: &str) -> String {
    format!("change_{}", getter)
}

/// Compare the first value returned by a zero-argument getter.
pub async fn check_variable<C: ExecutionClient>(
    handle: &ContractHandle<C>,
    method: &str,
    expected: &Expected,
) -> HarnessResult<()> {
    let kind = handle
        .artifact()
        .table()
        .method(method)?
        .outputs
        .first()
        .map(|p| p.kind)
        .ok_or_else(|| HarnessError::assertion(method, "one return value", "none"))?;
    let values = handle.low_call(method, &[]).await?;
    let actual = values
        .first()
        .ok_or_else(|| HarnessError::assertion(method, expected, "no value"))?;

    if !expected.matches(&kind, actual) {
        return Err(HarnessError::assertion(
            format!("mismatch {}", method),
            expected,
            actual,
        ));
    }
    log::info!("{} {}", method, actual);
    Ok(())
}

/// Values a freshly deployed token must report.
pub fn initial_expectations(
    eco_fund: Address,
    wemix: Address,
    block_deployed: u64,
) -> Vec<(&'static str, Expected)> {
    vec![
        ("name", TOKEN_NAME.into()),
        ("symbol", TOKEN_SYMBOL.into()),
        ("decimals", TOKEN_DECIMALS.into()),
        ("totalSupply", (*INITIAL_SUPPLY).into()),
        ("unitStaking", (*UNIT_STAKING).into()),
        ("minBlockWaitingWithdrawal", MIN_BLOCK_WAITING_WITHDRAWAL.into()),
        ("maxTimesMintingOnce", MAX_TIMES_MINTING_ONCE.into()),
        ("ecoFund", eco_fund.into()),
        ("wemix", wemix.into()),
        ("nextPartnerToMint", U256::zero().into()),
        ("mintToPartner", MINT_TO_PARTNER.into()),
        ("mintToEcoFund", MINT_TO_ECO_FUND.into()),
        ("mintToWemix", MINT_TO_WEMIX.into()),
        ("blockToMint", block_deployed.into()),
    ]
}

/// Run `change_<getter>(value)` as owner, then read the getter back.
pub async fn execute_change_method<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    getter: &str,
    value: &Expected,
) -> HarnessResult<()> {
    let setter = setter_name(getter);
    let receipt = handle
        .execute(None, &setter, &[value.to_abi_value()])
        .await?;
    require_success(&receipt, &setter)?;
    check_variable(handle, getter, value).await
}

/// Execute `method` and require the contract to reject it.
///
/// When `reason` is given the revert message must contain it.
pub async fn expect_failure<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    key: Option<&KeyPair>,
    method: &str,
    args: &[AbiValue],
    reason: Option<&str>,
) -> HarnessResult<Receipt> {
    let receipt = handle.execute(key, method, args).await?;
    if receipt.is_success() {
        return Err(HarnessError::assertion(
            format!("accepted to execute {}", method),
            "receipt status 0",
            format!("receipt status {}", receipt.status),
        ));
    }
    if let Some(reason) = reason {
        let actual = receipt.revert_reason.as_deref().unwrap_or_default();
        if !actual.contains(reason) {
            return Err(HarnessError::assertion(
                format!("revert reason of {}", method),
                reason,
                actual,
            ));
        }
    }
    log::info!(
        "ok > denied to execute {}. receipt.status : {}",
        method,
        receipt.status
    );
    Ok(receipt)
}

/// Execute `method` and require the contract to accept it.
pub async fn expect_success<C: ExecutionClient>(
    handle: &mut ContractHandle<C>,
    key: Option<&KeyPair>,
    method: &str,
    args: &[AbiValue],
) -> HarnessResult<Receipt> {
    let receipt = handle.execute(key, method, args).await?;
    require_success(&receipt, method)?;
    log::info!(
        "ok > accepted to execute {}. receipt.status : {}",
        method,
        receipt.status
    );
    Ok(receipt)
}
