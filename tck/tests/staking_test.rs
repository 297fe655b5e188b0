use primitive_types::U256;
use stakemint_tck::{
    chain::BlockWarp,
    config::HarnessConfig,
    contract::require_success,
    drivers::{execute_change_method, staked_serial, try_withdraw, StakeKind, StakingDriver},
    invariants::{check_contract_holds_stakes, check_partner_cardinality},
    oracle::{Expected, IdentityRegistry, PartnerLedger, StakeRecord},
    scenario::Scenario,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_config() -> HarnessConfig {
    HarnessConfig::default()
        .with_self_stake_partners(2)
        .with_delegated_partners(2)
        .with_withdrawal_wait(20)
        .with_stake_record_logging()
}

#[tokio::test]
async fn test_stake_workload() {
    init_logger();
    let mut scenario = Scenario::simulated(small_config(), 21).await.unwrap();
    let outcome = scenario.stake().await.unwrap();

    // self: 1 + 2 stakes, delegated: 1 + 2 stakes
    assert_eq!(outcome.stakes_executed, 6);
    assert_eq!(outcome.ledger.len(), 6);
    assert_eq!(outcome.identities.len(), 4);

    let self_staked = outcome.ledger.iter().filter(|r| !r.is_delegated()).count();
    assert_eq!(self_staked, 3);
    for record in outcome.ledger.iter().filter(|r| r.is_delegated()) {
        assert_eq!(record.payer, scenario.handle().owner());
    }
    for record in outcome.ledger.iter() {
        assert!(outcome.identities.contains(&record.partner));
    }

    let handle = scenario.handle();
    let partners_number: u64 = handle.call("partnersNumber", &[]).await.unwrap();
    check_partner_cardinality(outcome.ledger.len(), partners_number).unwrap();
    let contract_balance = handle.balance_of(&handle.address()).await.unwrap();
    check_contract_holds_stakes(&outcome.ledger, contract_balance).unwrap();

    // the contract's view matches the mirror record by record
    let loaded = PartnerLedger::load_from_contract(handle).await.unwrap();
    let mirrored: Vec<&StakeRecord> = outcome.ledger.iter().collect();
    let reloaded: Vec<&StakeRecord> = loaded.iter().collect();
    assert_eq!(mirrored, reloaded);
}

#[tokio::test]
async fn test_stake_requires_balance() {
    init_logger();
    let mut scenario = Scenario::simulated(small_config(), 22).await.unwrap();
    let config = scenario.config().clone();
    let handle = scenario.handle_mut();
    let partner = handle.new_credential();

    let mut driver = StakingDriver::new(handle, &config);
    let err = driver
        .stake_once(StakeKind::SelfStake, partner.address(), &partner, U256::zero())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("insufficient balance"));
    assert!(driver.ledger().is_empty());
}

#[tokio::test]
async fn test_withdraw_boundary() {
    init_logger();
    let mut scenario = Scenario::simulated(small_config(), 23).await.unwrap();
    let handle = scenario.handle_mut();
    execute_change_method(handle, "minBlockWaitingWithdrawal", &Expected::from(10u64))
        .await
        .unwrap();

    let partner = handle.new_credential();
    let receipt = handle
        .execute(None, "addAllowedPartner", &[partner.address().into()])
        .await
        .unwrap();
    require_success(&receipt, "addAllowedPartner").unwrap();
    let receipt = handle
        .execute(
            None,
            "stakeDelegated",
            &[partner.address().into(), U256::from(3u64).into()],
        )
        .await
        .unwrap();
    require_success(&receipt, "stakeDelegated").unwrap();
    let serial = staked_serial(handle, &receipt, "stakeDelegated").unwrap();
    let record: StakeRecord = handle
        .call("partnerBySerial", &[serial.into()])
        .await
        .unwrap();
    assert_eq!(record.block_waiting_withdrawal, 10);
    let withdrawable_at = record.withdrawable_at();

    // next transaction lands one block before the lock expires
    handle
        .client_mut()
        .warp_to_height(withdrawable_at - 2)
        .await
        .unwrap();
    let identities = IdentityRegistry::new();
    assert!(!try_withdraw(handle, &identities, &record).await.unwrap());
    assert_eq!(handle.current_block_height(), withdrawable_at - 1);

    assert!(try_withdraw(handle, &identities, &record).await.unwrap());
    assert_eq!(handle.current_block_height(), withdrawable_at);
    let partners_number: u64 = handle.call("partnersNumber", &[]).await.unwrap();
    assert_eq!(partners_number, 0);
}

#[tokio::test]
async fn test_withdraw_only_by_payer() {
    init_logger();
    let mut scenario = Scenario::simulated(small_config(), 24).await.unwrap();
    let outcome = scenario.stake().await.unwrap();
    let handle = scenario.handle_mut();

    let record = outcome
        .ledger
        .iter()
        .find(|r| r.is_delegated())
        .cloned()
        .unwrap();
    let partner_key = outcome.identities.get(&record.partner).unwrap().clone();
    let receipt = handle
        .execute(Some(&partner_key), "withdraw", &[record.serial.into()])
        .await
        .unwrap();
    assert!(!receipt.is_success());
    assert!(receipt.logs.is_empty());
    assert!(receipt
        .revert_reason
        .unwrap_or_default()
        .contains("caller is not the payer"));
}

#[tokio::test]
async fn test_withdraw_workload() {
    init_logger();
    let mut scenario = Scenario::simulated(small_config(), 25).await.unwrap();
    let owner = scenario.handle().owner();

    let report = scenario.withdraw().await.unwrap();
    assert_eq!(report.withdrawn, 6);
    assert!(report.rejected > 0);
    assert!(report.blocks_forced > 0);
    // self-staked partners were funded with 1 and 2 units
    let unit: U256 = scenario.handle().call("unitStaking", &[]).await.unwrap();
    assert_eq!(report.returned, unit * U256::from(3u64));

    let handle = scenario.handle();
    let supply: U256 = handle.call("totalSupply", &[]).await.unwrap();
    assert_eq!(handle.balance_of(&owner).await.unwrap(), supply);
}
