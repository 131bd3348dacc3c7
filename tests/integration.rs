//! Integration tests for the GalaSwap arbitrage bot.
//!
//! The mock-backed tests drive the full scan pipeline (discovery,
//! enumeration, simulation, selection, execution) without touching the
//! network. The ignored tests at the bottom interact with the real GalaSwap
//! API and require GALA_USER_ADDRESS (and GALA_PRIVATE_KEY for signing).
//! Run with: cargo test --test integration -- --ignored

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use galaswap_arb::arbitrage::{
    discover_active_edges, enumerate_cycles, meets_threshold, select_best_cycle, CycleExecutor,
    ExecutionOutcome,
};
use galaswap_arb::config::Config;
use galaswap_arb::exchange::{Dex, GalaSwapClient, MockDex};

/// A config for mock-backed runs, no environment needed.
fn mock_config() -> Config {
    Config {
        gala_api_base_url: "https://mock.invalid".to_string(),
        gala_private_key: "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
            .to_string(),
        gala_user_address: "eth|0x1234567890abcdef1234567890abcdef12345678".to_string(),
        token_keys: "GALA=GALA$Unit$none$none,GUSDC=GUSDC$Unit$none$none,GWETH=GWETH$Unit$none$none"
            .to_string(),
        pools: "GUSDC/GALA,GALA/GWETH,GWETH/GUSDC".to_string(),
        fallback_fee_tiers: "500,3000,10000".to_string(),
        pool_fee_overrides: String::new(),
        slippage_bps: 40,
        min_profit_bps: 20,
        profit_buffer_bps: 10,
        start_token: "GUSDC".to_string(),
        start_amount: dec!(100),
        liquidity_check_amount: dec!(100),
        max_hop_input: Decimal::ZERO,
        dry_run: true,
        max_cycles_per_scan: 12,
        scan_interval_seconds: 15,
        pool_refresh_interval: 10,
        http_timeout_ms: 15_000,
        port: 8080,
        rust_log: "info".to_string(),
        verbose: false,
    }
}

/// Script a profitable triangle: 100 GUSDC comes back as 100.5 GUSDC.
fn profitable_triangle(dex: &MockDex) {
    dex.set_rate("GUSDC", "GALA", 500, dec!(2.5));
    dex.set_rate("GALA", "GUSDC", 500, dec!(0.39));
    dex.set_rate("GALA", "GWETH", 3000, dec!(0.0002));
    dex.set_rate("GWETH", "GALA", 3000, dec!(4900));
    dex.set_rate("GWETH", "GUSDC", 500, dec!(2010));
    dex.set_rate("GUSDC", "GWETH", 500, dec!(0.00049));
}

#[tokio::test]
async fn full_scan_pipeline_finds_and_dry_runs_the_opportunity() {
    let dex = MockDex::new();
    profitable_triangle(&dex);
    let config = mock_config();

    let edges = discover_active_edges(&dex, &config).await;
    assert_eq!(edges.len(), 6, "all six directions should quote");

    let cycles = enumerate_cycles(&edges);
    assert!(!cycles.is_empty());

    let best = select_best_cycle(&dex, &cycles, &config)
        .await
        .expect("a profitable cycle should simulate");
    // 100 -> 250 GALA -> 0.05 GWETH -> 100.5 GUSDC = +50 bps.
    assert_eq!(best.gross_profit_bps, 50);
    assert_eq!(best.start_token, "GUSDC");
    assert!(meets_threshold(&best, config.min_profit_bps, config.profit_buffer_bps));

    let mut executor = CycleExecutor::new(&config).with_settle_delay(Duration::ZERO);
    let outcome = executor.execute(&dex, &best).await;

    let ExecutionOutcome::DryRun { hops } = outcome else {
        panic!("expected a dry run");
    };
    assert_eq!(hops.len(), 3);
    assert!(dex.submissions().is_empty(), "dry run must not submit");
}

#[tokio::test]
async fn live_execution_submits_every_hop() {
    let dex = MockDex::new();
    profitable_triangle(&dex);
    let config = Config {
        dry_run: false,
        ..mock_config()
    };

    let edges = discover_active_edges(&dex, &config).await;
    let cycles = enumerate_cycles(&edges);
    let best = select_best_cycle(&dex, &cycles, &config).await.unwrap();

    let mut executor = CycleExecutor::new(&config).with_settle_delay(Duration::ZERO);
    let outcome = executor.execute(&dex, &best).await;

    assert!(matches!(outcome, ExecutionOutcome::Completed { .. }));
    let submissions = dex.submissions();
    assert_eq!(submissions.len(), 3);
    // Hops chain back to the start token.
    assert_eq!(submissions[0].token_in, "GUSDC");
    assert_eq!(submissions[2].token_out, "GUSDC");
}

#[tokio::test]
async fn mid_cycle_failure_strands_the_position() {
    let dex = MockDex::new();
    profitable_triangle(&dex);
    let config = Config {
        dry_run: false,
        ..mock_config()
    };

    let edges = discover_active_edges(&dex, &config).await;
    let cycles = enumerate_cycles(&edges);
    let best = select_best_cycle(&dex, &cycles, &config).await.unwrap();

    // The second hop of the winning cycle is GALA -> GWETH.
    dex.fail_submission(&best.hops[1].token_in, &best.hops[1].token_out);

    let mut executor = CycleExecutor::new(&config).with_settle_delay(Duration::ZERO);
    let outcome = executor.execute(&dex, &best).await;

    let ExecutionOutcome::Aborted {
        hops, failed_hop, ..
    } = outcome
    else {
        panic!("expected an abort");
    };
    assert_eq!(failed_hop, 2);
    // Hop 1 went through and stands; hop 3 was never attempted.
    assert_eq!(dex.submissions().len(), 1);
    assert!(hops[0].tx_id.is_some());
}

#[tokio::test]
async fn unprofitable_market_yields_no_opportunity() {
    let dex = MockDex::new();
    // Round trip loses money: 100 -> 250 -> 0.05 -> 99.5.
    dex.set_rate("GUSDC", "GALA", 500, dec!(2.5));
    dex.set_rate("GALA", "GWETH", 3000, dec!(0.0002));
    dex.set_rate("GWETH", "GUSDC", 500, dec!(1990));
    let config = mock_config();

    let edges = discover_active_edges(&dex, &config).await;
    let cycles = enumerate_cycles(&edges);
    let best = select_best_cycle(&dex, &cycles, &config).await.unwrap();

    assert_eq!(best.gross_profit_bps, -50);
    assert!(!meets_threshold(&best, config.min_profit_bps, config.profit_buffer_bps));
}

// === Live API tests (ignored by default) ===

/// Get a live config from environment, or None to skip.
fn live_config() -> Option<Config> {
    dotenvy::dotenv().ok();
    std::env::var("GALA_USER_ADDRESS").ok()?;
    Config::load().ok()
}

/// Test that the real quote endpoint answers for the default GUSDC/GALA pool.
#[tokio::test]
#[ignore = "requires GALA_USER_ADDRESS and network access"]
async fn live_quote_gusdc_to_gala() {
    let config = match live_config() {
        Some(c) => c,
        None => {
            println!("Skipping: GALA_USER_ADDRESS not set");
            return;
        }
    };

    let client = GalaSwapClient::new(&config);
    let quote = client
        .best_quote("GUSDC", "GALA", dec!(10))
        .await
        .expect("quote failed");

    assert!(quote.amount_out > Decimal::ZERO);
    println!("10 GUSDC -> {} GALA (fee {})", quote.amount_out, quote.fee);
}

/// Test a full discovery pass against the real backend.
#[tokio::test]
#[ignore = "requires GALA_USER_ADDRESS and network access"]
async fn live_pool_discovery() {
    let config = match live_config() {
        Some(c) => c,
        None => {
            println!("Skipping: GALA_USER_ADDRESS not set");
            return;
        }
    };

    let client = GalaSwapClient::new(&config);
    let edges = discover_active_edges(&client, &config).await;
    println!("Active edges: {}", edges.len());
    for edge in &edges {
        println!("  {} -> {} (fee {})", edge.token_in, edge.token_out, edge.fee);
    }
}
