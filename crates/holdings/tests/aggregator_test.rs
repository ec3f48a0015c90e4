mod common;

use common::{address, token_info, MockEnrichment, MockRpc};
use holdings::BalanceAggregator;
use shared::{Error, NoEnrichment};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_example_two_wallets_ten_percent() {
    let rpc = MockRpc::new();
    let mint = address();
    let (w1, w2) = (address(), address());
    rpc.set_supply(&mint, 1000.0);
    rpc.add_account(&w1, &mint, 100.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator
        .aggregate(&[w1.clone(), w2.clone()], &[mint.clone()])
        .await
        .unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert_eq!(report.token_address, mint);
    assert_eq!(report.total_supply, 1000.0);
    assert_eq!(report.total_balance, 100.0);
    assert_eq!(format!("{:.4}", report.percentage_of_supply), "10.0000");
    assert_eq!(report.balances[0].address, w1);
    assert_eq!(report.balances[0].percentage, 10.0);
    assert_eq!(report.balances[1].address, w2);
    assert_eq!(report.balances[1].balance, 0.0);
    assert!(report.balances.iter().all(|b| b.error.is_none()));
}

#[tokio::test]
async fn test_duplicate_wallets_removed_and_counted() {
    let rpc = MockRpc::new();
    let mint = address();
    let (w1, w2) = (address(), address());
    rpc.set_supply(&mint, 50.0);
    rpc.add_account(&w1, &mint, 5.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator
        .aggregate(&[w1.clone(), w1.clone(), w2.clone()], &[mint])
        .await
        .unwrap();

    assert_eq!(run.wallet_count, 2);
    assert_eq!(run.duplicates_removed, 1);
    let report = run.tokens[0].as_ref().unwrap();
    assert_eq!(report.balances.len(), 2);
    assert_eq!(report.total_balance, 5.0);
}

#[tokio::test]
async fn test_multiple_accounts_are_summed() {
    let rpc = MockRpc::new();
    let mint = address();
    let wallet = address();
    rpc.set_supply(&mint, 200.0);
    rpc.add_account(&wallet, &mint, 10.0);
    rpc.add_account(&wallet, &mint, 30.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator.aggregate(&[wallet], &[mint]).await.unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert_eq!(report.balances[0].balance, 40.0);
    assert_eq!(report.percentage_of_supply, 20.0);
}

#[tokio::test]
async fn test_wallet_without_accounts_is_zero_not_error() {
    let rpc = MockRpc::new();
    let mint = address();
    rpc.set_supply(&mint, 1000.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator.aggregate(&[address()], &[mint]).await.unwrap();

    let record = &run.tokens[0].as_ref().unwrap().balances[0];
    assert_eq!(record.balance, 0.0);
    assert_eq!(record.percentage, 0.0);
    assert!(record.error.is_none());
}

#[tokio::test]
async fn test_zero_supply_gives_zero_percentages() {
    let rpc = MockRpc::new();
    let mint = address();
    let wallet = address();
    rpc.set_supply(&mint, 0.0);
    rpc.add_account(&wallet, &mint, 7.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator.aggregate(&[wallet], &[mint]).await.unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert_eq!(report.total_balance, 7.0);
    assert_eq!(report.percentage_of_supply, 0.0);
    assert_eq!(report.balances[0].percentage, 0.0);
}

#[tokio::test]
async fn test_wallet_failure_is_isolated() {
    let rpc = MockRpc::new();
    let mint = address();
    let (good, bad) = (address(), address());
    rpc.set_supply(&mint, 100.0);
    rpc.add_account(&good, &mint, 25.0);
    rpc.add_account(&bad, &mint, 50.0);
    rpc.fail_owner(&bad);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator
        .aggregate(&[good.clone(), bad.clone()], &[mint])
        .await
        .unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert_eq!(report.balances[0].balance, 25.0);
    assert!(report.balances[0].error.is_none());

    let failed = &report.balances[1];
    assert_eq!(failed.address, bad);
    assert_eq!(failed.balance, 0.0);
    assert_eq!(failed.percentage, 0.0);
    assert!(failed.error.as_deref().unwrap().contains("connection reset"));

    assert_eq!(report.total_balance, 25.0);
    assert_eq!(report.failed_wallets(), 1);
}

#[tokio::test]
async fn test_account_balance_failure_fails_only_that_wallet() {
    let rpc = MockRpc::new();
    let mint = address();
    let (w1, w2) = (address(), address());
    rpc.set_supply(&mint, 100.0);
    rpc.add_account(&w1, &mint, 10.0);
    let broken = rpc.add_account(&w1, &mint, 20.0);
    rpc.add_account(&w2, &mint, 30.0);
    rpc.fail_account(&broken);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator.aggregate(&[w1, w2], &[mint]).await.unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert!(report.balances[0].error.is_some());
    assert_eq!(report.balances[0].balance, 0.0);
    assert_eq!(report.balances[1].balance, 30.0);
    assert_eq!(report.total_balance, 30.0);
}

#[tokio::test]
async fn test_supply_failure_rejects_only_that_token() {
    let rpc = MockRpc::new();
    let (good_mint, missing_mint) = (address(), address());
    let wallet = address();
    rpc.set_supply(&good_mint, 10.0);
    rpc.add_account(&wallet, &good_mint, 1.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator
        .aggregate(&[wallet], &[missing_mint.clone(), good_mint.clone()])
        .await
        .unwrap();

    assert_eq!(run.tokens.len(), 2);
    let failure = run.tokens[0].as_ref().unwrap_err();
    assert_eq!(failure.token_address, missing_mint);
    assert!(failure.error.contains("could not find mint"));

    let report = run.tokens[1].as_ref().unwrap();
    assert_eq!(report.token_address, good_mint);
    assert_eq!(report.percentage_of_supply, 10.0);
}

#[tokio::test]
async fn test_enrichment_failure_does_not_block_report() {
    let rpc = MockRpc::new();
    let mint = address();
    let wallet = address();
    rpc.set_supply(&mint, 100.0);
    rpc.add_account(&wallet, &mint, 50.0);

    let mut enrichment = MockEnrichment::default();
    enrichment.failing.insert(mint.clone());

    let aggregator = BalanceAggregator::new(rpc, enrichment);
    let run = aggregator.aggregate(&[wallet], &[mint]).await.unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert!(report.info.is_none());
    assert_eq!(report.total_balance, 50.0);
    assert_eq!(report.percentage_of_supply, 50.0);
}

#[tokio::test]
async fn test_enrichment_attached_when_available() {
    let rpc = MockRpc::new();
    let mint = address();
    let wallet = address();
    rpc.set_supply(&mint, 100.0);
    rpc.add_account(&wallet, &mint, 4.0);

    let mut enrichment = MockEnrichment::default();
    enrichment.infos.insert(mint.clone(), token_info("TKN", 2.5));

    let aggregator = BalanceAggregator::new(rpc, enrichment);
    let run = aggregator.aggregate(&[wallet], &[mint]).await.unwrap();

    let report = run.tokens[0].as_ref().unwrap();
    assert_eq!(report.info.as_ref().unwrap().symbol.as_deref(), Some("TKN"));
    assert_eq!(report.total_value_usd(), Some(10.0));
}

#[tokio::test]
async fn test_empty_wallets_rejected_before_network() {
    let rpc = Arc::new(MockRpc::new());
    let enrichment = Arc::new(MockEnrichment::default());
    let aggregator = BalanceAggregator::new(rpc.clone(), enrichment.clone());

    let result = aggregator
        .aggregate(&["".to_string(), "   ".to_string()], &[address()])
        .await;

    assert!(matches!(result, Err(Error::EmptyInput(field)) if field == "wallet addresses"));
    assert_eq!(rpc.call_count(), 0);
    assert_eq!(enrichment.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_tokens_rejected_before_network() {
    let rpc = Arc::new(MockRpc::new());
    let aggregator = BalanceAggregator::new(rpc.clone(), NoEnrichment);

    let result = aggregator.aggregate(&[address()], &[]).await;

    assert!(matches!(result, Err(Error::EmptyInput(field)) if field == "token addresses"));
    assert_eq!(rpc.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_address_named_in_error() {
    let rpc = Arc::new(MockRpc::new());
    let aggregator = BalanceAggregator::new(rpc.clone(), NoEnrichment);

    let result = aggregator
        .aggregate(&[address(), "abc123".to_string()], &[address()])
        .await;

    match result {
        Err(Error::InvalidAddress(addr)) => assert_eq!(addr, "abc123"),
        other => panic!("Expected InvalidAddress error, got {:?}", other),
    }
    assert_eq!(rpc.call_count(), 0);

    let result = aggregator.aggregate(&[address()], &["0xdeadbeef".to_string()]).await;
    assert!(matches!(result, Err(Error::InvalidAddress(addr)) if addr == "0xdeadbeef"));
    assert_eq!(rpc.call_count(), 0);
}

#[tokio::test]
async fn test_duplicate_tokens_reported_once() {
    let rpc = MockRpc::new();
    let mint = address();
    rpc.set_supply(&mint, 1.0);

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let run = aggregator
        .aggregate(&[address()], &[mint.clone(), mint.clone()])
        .await
        .unwrap();

    assert_eq!(run.tokens.len(), 1);
    assert_eq!(run.duplicates_removed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_is_concurrent() {
    let rpc = MockRpc::with_delay(Duration::from_secs(1));
    let mints: Vec<String> = (0..3).map(|_| address()).collect();
    let wallets: Vec<String> = (0..4).map(|_| address()).collect();
    for mint in &mints {
        rpc.set_supply(mint, 100.0);
        for wallet in &wallets {
            rpc.add_account(wallet, mint, 1.0);
        }
    }

    let aggregator = BalanceAggregator::new(rpc, NoEnrichment);
    let start = tokio::time::Instant::now();
    let run = aggregator.aggregate(&wallets, &mints).await.unwrap();

    // supply, then accounts, then balances: three sequential steps
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_secs(4));
    assert!(run.reports().all(|r| r.total_balance == 4.0));
}

#[tokio::test(start_paused = true)]
async fn test_supply_and_enrichment_fetched_together() {
    let rpc = MockRpc::with_delay(Duration::from_secs(1));
    let mint = address();
    rpc.set_supply(&mint, 100.0);

    let mut enrichment = MockEnrichment {
        delay: Some(Duration::from_secs(1)),
        ..MockEnrichment::default()
    };
    enrichment.infos.insert(mint.clone(), token_info("TKN", 1.0));

    let aggregator = BalanceAggregator::new(rpc, enrichment);
    let start = tokio::time::Instant::now();
    let report = aggregator.aggregate_token(&mint, &[]).await.unwrap();

    // one second each, awaited side by side
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2));
    assert_eq!(report.info.unwrap().symbol.as_deref(), Some("TKN"));
    assert!(report.balances.is_empty());
}
