//! HTTP API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::arbitrage::BotStats;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Whether the bot has finished its first pool discovery.
    pub ready: Arc<std::sync::atomic::AtomicBool>,
    /// Number of scan iterations completed.
    pub scan_count: Arc<tokio::sync::RwLock<u64>>,
    /// Best cycle seen in the most recent scan, as "A->B->C->A".
    pub best_cycle: Arc<tokio::sync::RwLock<Option<String>>>,
    /// Execution stats.
    pub stats: Arc<tokio::sync::RwLock<BotStats>>,
}

impl AppState {
    /// Create new app state.
    pub fn new() -> Self {
        Self {
            ready: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            scan_count: Arc::new(tokio::sync::RwLock::new(0)),
            best_cycle: Arc::new(tokio::sync::RwLock::new(None)),
            stats: Arc::new(tokio::sync::RwLock::new(BotStats::default())),
        }
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready
            .store(ready, std::sync::atomic::Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether the bot has discovered its pool graph.
    pub ready: bool,
    /// Scans completed so far.
    pub scan_count: u64,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Service status.
    pub status: &'static str,
    /// Scans completed so far.
    pub scan_count: u64,
    /// Best cycle from the most recent scan.
    pub best_cycle: Option<String>,
    /// Statistics.
    pub stats: StatsResponse,
}

/// Statistics in status response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Cycles that cleared the profit threshold.
    pub opportunities_found: u64,
    /// Cycles fully executed.
    pub cycles_executed: u64,
    /// Cycles aborted mid-way.
    pub cycles_aborted: u64,
    /// Hops accepted by the exchange.
    pub hops_submitted: u64,
    /// Dry-run walkthroughs.
    pub dry_runs: u64,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let scan_count = *state.scan_count.read().await;

    let response = ReadyResponse {
        ready: is_ready,
        scan_count,
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Status handler - returns bot status and statistics.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let scan_count = *state.scan_count.read().await;
    let best_cycle = state.best_cycle.read().await.clone();
    let stats = state.stats.read().await;

    let status = if state.is_ready() { "running" } else { "starting" };

    Json(StatusResponse {
        status,
        scan_count,
        best_cycle,
        stats: StatsResponse {
            opportunities_found: stats.opportunities_found,
            cycles_executed: stats.cycles_executed,
            cycles_aborted: stats.cycles_aborted,
            hops_submitted: stats.hops_submitted,
            dry_runs: stats.dry_runs,
        },
    })
}
