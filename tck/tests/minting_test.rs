use primitive_types::U256;
use stakemint_common::config::{INITIAL_SUPPLY, MINT_TO_ECO_FUND, MINT_TO_PARTNER, MINT_TO_WEMIX};
use stakemint_tck::{
    config::HarnessConfig,
    drivers::{
        execute_change_method, run_mint_campaign, try_withdraw, MintSnapshot, StakingDriver,
    },
    oracle::{Expected, PartnerLedger},
    scenario::Scenario,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn test_mint_without_partners() {
    init_logger();
    let config = HarnessConfig::default().with_mint_iterations(120);
    let mut scenario = Scenario::simulated(config, 31).await.unwrap();

    let report = scenario.mint().await.unwrap();
    let rounds = report.end_block - report.start_block;
    assert!(rounds >= 120);
    assert_eq!(report.prediction.rounds, rounds);
    assert!(report.prediction.credits_by_address.is_empty());

    let handle = scenario.handle();
    let eco_fund = handle.balance_of(&scenario.eco_fund()).await.unwrap();
    let wemix = handle.balance_of(&scenario.wemix()).await.unwrap();
    assert_eq!(eco_fund, U256::from(MINT_TO_ECO_FUND) * U256::from(rounds));
    assert_eq!(wemix, U256::from(MINT_TO_WEMIX) * U256::from(rounds));

    let cursor: u64 = handle.call("nextPartnerToMint", &[]).await.unwrap();
    assert_eq!(cursor, 0);
}

#[tokio::test]
async fn test_mint_with_partners() {
    init_logger();
    let config = HarnessConfig::default()
        .with_self_stake_partners(3)
        .with_delegated_partners(2)
        .with_mint_iterations(200);
    let mut scenario = Scenario::simulated(config, 32).await.unwrap();

    let outcome = scenario.stake().await.unwrap();
    let report = scenario.mint().await.unwrap();

    // every record was credited at least once over so many rounds
    let records = outcome.ledger.len() as u64;
    assert!(report.prediction.rounds >= records);
    assert!(report.prediction.credits_by_index.iter().all(|c| *c > 0));
    let credited: u64 = report.prediction.credits_by_index.iter().sum();
    assert_eq!(credited, report.prediction.rounds);

    let supply: U256 = scenario.handle().call("totalSupply", &[]).await.unwrap();
    assert_eq!(supply, *INITIAL_SUPPLY + report.prediction.total_minted);
}

#[tokio::test]
async fn test_mint_caps_rounds_per_call() {
    init_logger();
    let mut scenario = Scenario::simulated(HarnessConfig::default(), 33)
        .await
        .unwrap();
    let handle = scenario.handle_mut();
    execute_change_method(handle, "maxTimesMintingOnce", &Expected::from(5u64))
        .await
        .unwrap();
    for _ in 0..20 {
        handle.commit_block().await.unwrap();
    }

    let pending: u64 = handle.call("pendingBlock", &[]).await.unwrap();
    assert!(pending > 5);
    let key = handle.new_credential();
    let receipt = handle.execute(Some(&key), "mint", &[]).await.unwrap();
    assert!(receipt.is_success());
    assert_eq!(handle.logs_of(&receipt, "Minted").unwrap().len(), 1);

    // one mint credits at most five rounds, the rest stays pending
    let after: u64 = handle.call("pendingBlock", &[]).await.unwrap();
    assert_eq!(after, pending + 1 - 5);

    // the campaign drains the backlog
    let report = run_mint_campaign(handle, 10).await.unwrap();
    assert!(report.prediction.rounds >= after);
}

#[tokio::test]
async fn test_mint_after_ledger_shrinks() {
    init_logger();
    let config = HarnessConfig::default()
        .with_self_stake_partners(2)
        .with_delegated_partners(2)
        .with_mint_iterations(25);
    let mut scenario = Scenario::simulated(config, 34).await.unwrap();
    execute_change_method(
        scenario.handle_mut(),
        "minBlockWaitingWithdrawal",
        &Expected::from(1u64),
    )
    .await
    .unwrap();

    let outcome = scenario.stake().await.unwrap();
    let first = scenario.mint().await.unwrap();

    let handle = scenario.handle_mut();
    let cursor: u64 = handle.call("nextPartnerToMint", &[]).await.unwrap();
    assert_eq!(cursor, first.prediction.final_cursor.raw());
    let ledger = PartnerLedger::load_from_contract(handle).await.unwrap();
    let len = ledger.len() as u64;
    assert!(cursor >= 1 && cursor <= len);

    // withdraw from the tail until the raw cursor is at or past the end
    let removed = (len - cursor).max(1) as usize;
    let tail: Vec<_> = (ledger.len() - removed..ledger.len())
        .rev()
        .filter_map(|index| ledger.get_index(index).cloned())
        .collect();
    assert_eq!(tail.len(), removed);
    for record in &tail {
        assert!(try_withdraw(handle, &outcome.identities, record)
            .await
            .unwrap());
    }

    let snapshot = MintSnapshot::capture(handle).await.unwrap();
    assert_eq!(snapshot.ledger.len(), ledger.len() - removed);
    assert!(!snapshot.ledger.is_empty());
    assert_eq!(snapshot.cursor.raw(), cursor);
    assert!(snapshot.cursor.raw() >= snapshot.ledger.len() as u64);
    assert_eq!(snapshot.cursor.resolve(snapshot.ledger.len()), Some(0));

    let second = scenario.mint().await.unwrap();
    // the stale cursor wrapped, so the head record was picked first
    assert!(second.prediction.rounds >= 1);
    assert!(second.prediction.credits_by_index[0] >= 1);
    assert_eq!(second.prediction.credits_by_index.len(), snapshot.ledger.len());

    let supply: U256 = scenario.handle().call("totalSupply", &[]).await.unwrap();
    assert_eq!(
        supply,
        *INITIAL_SUPPLY + first.prediction.total_minted + second.prediction.total_minted
    );
}

#[tokio::test]
async fn test_mint_after_ledger_grows() {
    init_logger();
    let config = HarnessConfig::default()
        .with_self_stake_partners(1)
        .with_delegated_partners(1)
        .with_mint_iterations(5);
    let mut scenario = Scenario::simulated(config.clone(), 35).await.unwrap();

    let outcome = scenario.stake().await.unwrap();
    let first = scenario.mint().await.unwrap();

    // two late partners: one self-staked unit, two delegated units
    let handle = scenario.handle_mut();
    let unit: U256 = handle.call("unitStaking", &[]).await.unwrap();
    let min_wait: U256 = handle.call("minBlockWaitingWithdrawal", &[]).await.unwrap();
    let mut driver = StakingDriver::new(handle, &config);
    let late_self = driver.self_stake(0, unit, min_wait).await.unwrap();
    let late_delegated = driver.delegated_stake(1, unit, min_wait).await.unwrap();
    assert_eq!(driver.ledger().len(), 3);

    let before = MintSnapshot::capture(handle).await.unwrap();
    assert_eq!(before.ledger.len(), outcome.ledger.len() + 3);
    assert_eq!(before.cursor, first.prediction.final_cursor);
    assert!(before.balances[&late_self].is_zero());
    assert!(before.balances[&late_delegated].is_zero());

    let second = run_mint_campaign(handle, 12).await.unwrap();
    let prediction = &second.prediction;
    assert!(prediction.rounds >= before.ledger.len() as u64);
    assert!(prediction.credits_by_index.iter().all(|c| *c > 0));
    assert_eq!(prediction.credits_by_index.iter().sum::<u64>(), prediction.rounds);

    for partner in before.ledger.distinct_partners() {
        let credit = prediction.credit_to(&partner);
        assert!(!credit.is_zero());
        assert_eq!(
            handle.balance_of(&partner).await.unwrap(),
            before.balances[&partner] + credit
        );
    }
    let late_credits = prediction.credit_to(&late_self) + prediction.credit_to(&late_delegated);
    let records_of_late = (before.ledger.len() - 3..before.ledger.len())
        .map(|index| prediction.credits_by_index[index])
        .sum::<u64>();
    assert_eq!(
        late_credits,
        U256::from(MINT_TO_PARTNER) * U256::from(records_of_late)
    );

    let cursor: u64 = handle.call("nextPartnerToMint", &[]).await.unwrap();
    assert_eq!(cursor, prediction.final_cursor.raw());
}
