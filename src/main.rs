//! GalaSwap triangular arbitrage bot entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use galaswap_arb::api::{create_router, AppState};
use galaswap_arb::arbitrage::{
    discover_active_edges, enumerate_cycles, inactive_pairs, meets_threshold, select_best_cycle,
    Cycle, CycleExecutor, ExecutionOutcome, PoolEdge,
};
use galaswap_arb::config::Config;
use galaswap_arb::exchange::GalaSwapClient;
use galaswap_arb::metrics;
use galaswap_arb::signing::address_from_private_key;
use galaswap_arb::utils::shutdown_signal;

/// GalaSwap triangular arbitrage bot.
#[derive(Parser, Debug)]
#[command(name = "galaswap-arb")]
#[command(about = "Automated triangular arbitrage bot for the GalaSwap DEX")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Run in dry-run mode (no signing, no submission).
    #[arg(long)]
    dry_run: Option<bool>,

    /// HTTP server port for health/status.
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the main scan loop (default).
    Run {
        /// Run in dry-run mode (no signing, no submission).
        #[arg(long)]
        dry_run: Option<bool>,

        /// HTTP server port for health/status.
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Probe the configured pools and show the active edges.
    DiscoverPools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("galaswap_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::DiscoverPools) => cmd_discover_pools().await,
        Some(Command::Run { dry_run, port }) => cmd_run(dry_run, port).await,
        None => cmd_run(args.dry_run, args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("GALASWAP ARB BOT - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Check private key
    if config.gala_private_key.is_empty() {
        println!("Private key: not set (dry-run only)");
    } else {
        print!("Checking private key... ");
        match address_from_private_key(&config.gala_private_key) {
            Ok(addr) => {
                println!("OK");
                println!("  Derived address: {}", addr);
                if addr != config.gala_user_address {
                    println!(
                        "  WARNING: derived address differs from GALA_USER_ADDRESS ({})",
                        config.gala_user_address
                    );
                }
            }
            Err(e) => {
                println!("FAILED");
                println!("  Error: {}", e);
                return Err(anyhow::anyhow!("Private key invalid"));
            }
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  API Base URL: {}", config.gala_api_base_url);
    println!("  Start Token: {}", config.start_token);
    println!("  Start Amount: {}", config.start_amount);
    println!("  Pools: {}", config.pools);
    println!("  Fee Tiers: {}", config.fallback_fee_tiers);
    println!("  Slippage: {} bps", config.slippage_bps);
    println!(
        "  Profit Gate: {} bps ({} min + {} buffer)",
        config.profit_threshold_bps(),
        config.min_profit_bps,
        config.profit_buffer_bps
    );
    println!("  Dry Run: {}", config.dry_run);
    println!("  Scan Interval: {}s", config.scan_interval_seconds);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Probe the configured pools and show the active edges.
async fn cmd_discover_pools() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("GALASWAP ARB BOT - POOL DISCOVERY");
    println!("======================================================================");

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let client = GalaSwapClient::new(&config);
    println!("Host: {}", config.gala_api_base_url);
    println!("Probe amount: {}\n", config.liquidity_check_amount);

    let edges = discover_active_edges(&client, &config).await;

    println!("Active edges: {}", edges.len());
    println!("----------------------------------------------------------------------");
    for edge in &edges {
        println!("  {} -> {}  (fee {})", edge.token_in, edge.token_out, edge.fee);
    }

    let dead = inactive_pairs(&edges, &config.pool_pairs());
    if !dead.is_empty() {
        println!("----------------------------------------------------------------------");
        println!("Pools with no active edge:");
        for (a, b) in &dead {
            println!("  {}/{}", a, b);
        }
    }

    let cycles = enumerate_cycles(&edges);
    let start_cycles = cycles
        .iter()
        .filter(|c| c.start() == config.start_token)
        .count();
    println!("----------------------------------------------------------------------");
    println!(
        "Closable 3-cycles: {} ({} starting from {})",
        cycles.len(),
        start_cycles,
        config.start_token
    );
    println!("======================================================================");

    Ok(())
}

/// Run the main scan loop.
async fn cmd_run(dry_run_override: Option<bool>, port: u16) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(dry_run) = dry_run_override {
        config.dry_run = dry_run;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!(
        "Mode: {}",
        if config.dry_run { "SIMULATION" } else { "LIVE TRADING" }
    );
    info!("Start token: {} ({})", config.start_token, config.start_amount);
    info!(
        "Profit gate: {} bps, slippage: {} bps",
        config.profit_threshold_bps(),
        config.slippage_bps
    );

    // Create app state
    let app_state = AppState::new();

    // The recorder must exist before the metric descriptions are registered.
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone()).route(
        "/metrics",
        axum::routing::get(move || async move { prometheus.render() }),
    );

    // Spawn HTTP server
    let _server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    // Create GalaSwap client and executor
    let client = GalaSwapClient::new(&config);
    let mut executor = CycleExecutor::new(&config);

    info!("========================================");
    info!("GALASWAP TRIANGULAR ARBITRAGE BOT STARTED");
    info!("========================================");

    let mut edges: Vec<PoolEdge> = Vec::new();
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut scan_count = 0u64;

    loop {
        // Periodic pool rediscovery; scan 0 does the initial pass.
        if scan_count % config.pool_refresh_interval == 0 {
            info!("Refreshing pool graph...");
            edges = discover_active_edges(&client, &config).await;

            let dead = inactive_pairs(&edges, &config.pool_pairs());
            for (a, b) in &dead {
                warn!("Pool {}/{} has no active edge", a, b);
            }

            cycles = enumerate_cycles(&edges);
            info!(
                "Pool graph: {} edges, {} closable cycles",
                edges.len(),
                cycles.len()
            );
            app_state.set_ready(true);
        }

        scan_count += 1;

        if edges.is_empty() {
            warn!(
                "[Scan #{}] No active pool edges; retrying in {}s",
                scan_count, config.scan_interval_seconds
            );
            *app_state.scan_count.write().await = scan_count;
            tokio::time::sleep(Duration::from_secs(config.scan_interval_seconds)).await;
            continue;
        }

        // Simulate candidates and keep the strict best.
        match select_best_cycle(&client, &cycles, &config).await {
            Some(best) => {
                let cycle_label = best
                    .hops
                    .iter()
                    .map(|h| h.token_in.as_str())
                    .chain(std::iter::once(best.start_token.as_str()))
                    .collect::<Vec<_>>()
                    .join("->");
                *app_state.best_cycle.write().await = Some(cycle_label.clone());

                if meets_threshold(&best, config.min_profit_bps, config.profit_buffer_bps) {
                    info!(
                        "[Scan #{}] Opportunity: {} at +{} bps",
                        scan_count, cycle_label, best.gross_profit_bps
                    );
                    executor.stats.opportunities_found += 1;

                    match executor.execute(&client, &best).await {
                        ExecutionOutcome::Completed { hops } => {
                            info!("Cycle completed: {} hops submitted", hops.len());
                        }
                        ExecutionOutcome::DryRun { hops } => {
                            info!("Dry run walked {} hops, nothing submitted", hops.len());
                        }
                        ExecutionOutcome::Aborted {
                            failed_hop, reason, ..
                        } => {
                            error!(
                                "Cycle aborted at hop {}: {} (position may be stranded)",
                                failed_hop, reason
                            );
                        }
                    }

                    *app_state.stats.write().await = executor.stats;
                } else {
                    info!(
                        "[Scan #{}] Best cycle {} at {} bps below {} bps gate",
                        scan_count,
                        cycle_label,
                        best.gross_profit_bps,
                        config.profit_threshold_bps()
                    );
                }
            }
            None => {
                info!("[Scan #{}] No viable cycle simulations", scan_count);
                *app_state.best_cycle.write().await = None;
            }
        }

        *app_state.scan_count.write().await = scan_count;
        tokio::time::sleep(Duration::from_secs(config.scan_interval_seconds)).await;
    }
}
