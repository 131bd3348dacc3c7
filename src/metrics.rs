//! Prometheus metrics for latency tracking and monitoring.
//!
//! This module provides metrics for:
//! - Quote request latency
//! - Bundle submission latency
//! - Signing operation latency
//! - Scan, simulation, and execution counters

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Quote request latency metric name.
pub const METRIC_QUOTE_LATENCY: &str = "quote_latency_ms";
/// Bundle submission latency metric name.
pub const METRIC_BUNDLE_SUBMIT_LATENCY: &str = "bundle_submit_latency_ms";
/// Signing latency metric name.
pub const METRIC_SIGNING_LATENCY: &str = "signing_latency_ms";
/// Pool probes counter metric name.
pub const METRIC_POOL_PROBES: &str = "pool_probes_total";
/// Cycles simulated counter metric name.
pub const METRIC_CYCLES_SIMULATED: &str = "cycles_simulated_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "opportunities_detected_total";
/// Cycles executed counter metric name.
pub const METRIC_CYCLES_EXECUTED: &str = "cycles_executed_total";
/// Cycles aborted counter metric name.
pub const METRIC_CYCLES_ABORTED: &str = "cycles_aborted_total";
/// Hops submitted counter metric name.
pub const METRIC_HOPS_SUBMITTED: &str = "hops_submitted_total";
/// Hops failed counter metric name.
pub const METRIC_HOPS_FAILED: &str = "hops_failed_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    // Latency histograms
    describe_histogram!(METRIC_QUOTE_LATENCY, "Quote request latency in milliseconds");
    describe_histogram!(
        METRIC_BUNDLE_SUBMIT_LATENCY,
        "Bundle submission latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SIGNING_LATENCY,
        "Cryptographic signing latency in milliseconds"
    );

    // Counters
    describe_counter!(METRIC_POOL_PROBES, "Total number of pool liquidity probes");
    describe_counter!(METRIC_CYCLES_SIMULATED, "Total number of cycles simulated");
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of arbitrage opportunities above the profit threshold"
    );
    describe_counter!(METRIC_CYCLES_EXECUTED, "Total number of cycles fully executed");
    describe_counter!(
        METRIC_CYCLES_ABORTED,
        "Total number of cycle executions aborted mid-way"
    );
    describe_counter!(METRIC_HOPS_SUBMITTED, "Total number of swap hops submitted");
    describe_counter!(METRIC_HOPS_FAILED, "Total number of swap hops that failed");

    debug!("Metrics initialized");
}

/// Increment pool probe counter.
pub fn inc_pool_probes() {
    counter!(METRIC_POOL_PROBES).increment(1);
}

/// Increment cycles simulated counter.
pub fn inc_cycles_simulated() {
    counter!(METRIC_CYCLES_SIMULATED).increment(1);
}

/// Increment opportunities detected counter.
pub fn inc_opportunities_detected() {
    counter!(METRIC_OPPORTUNITIES_DETECTED).increment(1);
}

/// Increment cycles executed counter.
pub fn inc_cycles_executed() {
    counter!(METRIC_CYCLES_EXECUTED).increment(1);
}

/// Increment cycles aborted counter.
pub fn inc_cycles_aborted() {
    counter!(METRIC_CYCLES_ABORTED).increment(1);
}

/// Increment hops submitted counter.
pub fn inc_hops_submitted() {
    counter!(METRIC_HOPS_SUBMITTED).increment(1);
}

/// Increment hops failed counter.
pub fn inc_hops_failed() {
    counter!(METRIC_HOPS_FAILED).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for quote requests.
pub fn timer_quote() -> LatencyTimer {
    LatencyTimer::new(METRIC_QUOTE_LATENCY)
}

/// Create a latency timer for bundle submissions.
pub fn timer_bundle_submit() -> LatencyTimer {
    LatencyTimer::new(METRIC_BUNDLE_SUBMIT_LATENCY)
}

/// Create a latency timer for signing operations.
pub fn timer_signing() -> LatencyTimer {
    LatencyTimer::new(METRIC_SIGNING_LATENCY)
}
