//! Non-atomic execution of a simulated cycle, one hop at a time.
//!
//! Every hop goes through the same pipeline: build the signable payload,
//! sign it, submit it under a transaction-type label, then poll the
//! transaction status once as a best effort. A failed hop aborts the cycle
//! immediately; tokens already swapped by earlier hops stay swapped. There
//! is no rollback.

use std::time::Duration;

use chrono::{DateTime, Utc};
use strum::Display;
use tracing::{error, info, instrument, warn};

use crate::config::Config;
use crate::exchange::{Dex, SwapRequest};
use crate::metrics;
use crate::signing;

use super::simulator::CycleResult;

/// Transaction-type labels tried in order when submitting a bundle. The
/// backend has accepted both spellings across versions.
pub const TX_TYPE_CANDIDATES: [&str; 2] = ["swap", "Swap"];

/// How far a single hop progressed through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HopState {
    /// Nothing attempted yet.
    Pending,
    /// Signable payload obtained from the exchange.
    PayloadBuilt,
    /// Payload signed locally.
    Signed,
    /// Bundle accepted by the exchange.
    Submitted,
    /// Post-submission status poll completed.
    StatusChecked,
}

/// Record of one hop's execution.
#[derive(Debug, Clone)]
pub struct HopReport {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Fee tier used.
    pub fee: u32,
    /// Input amount.
    pub amount_in: rust_decimal::Decimal,
    /// Slippage-bounded minimum output.
    pub min_amount_out: rust_decimal::Decimal,
    /// Pipeline state the hop reached.
    pub state: HopState,
    /// Transaction id, present once submitted.
    pub tx_id: Option<String>,
    /// Status string from the post-submission poll.
    pub status: Option<String>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Terminal outcome of a cycle execution.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// All three hops submitted.
    Completed {
        /// Per-hop reports.
        hops: Vec<HopReport>,
    },
    /// Execution stopped at a failed hop. Earlier hops stand.
    Aborted {
        /// Reports for hops attempted so far, including the failed one.
        hops: Vec<HopReport>,
        /// 1-based index of the hop that failed.
        failed_hop: usize,
        /// Why the hop failed.
        reason: String,
    },
    /// Dry run: payloads built and bounds computed, nothing signed or sent.
    DryRun {
        /// Per-hop reports.
        hops: Vec<HopReport>,
    },
}

/// Running totals exposed over the status endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct BotStats {
    /// Cycles that cleared the profit threshold.
    pub opportunities_found: u64,
    /// Cycles fully executed (or fully dry-run).
    pub cycles_executed: u64,
    /// Cycles aborted mid-way.
    pub cycles_aborted: u64,
    /// Individual hops accepted by the exchange.
    pub hops_submitted: u64,
    /// Dry-run walkthroughs.
    pub dry_runs: u64,
}

/// Executes simulated cycles hop by hop.
pub struct CycleExecutor {
    slippage_bps: u32,
    dry_run: bool,
    user_address: String,
    private_key: String,
    settle_delay: Duration,
    /// Totals accumulated across executions.
    pub stats: BotStats,
}

impl CycleExecutor {
    /// Create an executor from config.
    pub fn new(config: &Config) -> Self {
        Self {
            slippage_bps: config.slippage_bps,
            dry_run: config.dry_run,
            user_address: config.gala_user_address.clone(),
            private_key: config.gala_private_key.clone(),
            settle_delay: Duration::from_secs(2),
            stats: BotStats::default(),
        }
    }

    /// Override the pause between submission and the status poll.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Execute a simulated cycle. Hops run strictly in order; the first
    /// failure aborts with the hops attempted so far.
    #[instrument(skip(self, dex, result), fields(start = %result.start_token, profit_bps = result.gross_profit_bps))]
    pub async fn execute<D: Dex>(&mut self, dex: &D, result: &CycleResult) -> ExecutionOutcome {
        let mut hops: Vec<HopReport> = Vec::with_capacity(result.hops.len());

        for (index, hop) in result.hops.iter().enumerate() {
            let hop_number = index + 1;
            let request = SwapRequest {
                token_in: hop.token_in.clone(),
                token_out: hop.token_out.clone(),
                amount_in: hop.amount_in,
                quoted_out: hop.amount_out,
                fee: hop.fee,
                slippage_bps: self.slippage_bps,
            };

            let mut report = HopReport {
                token_in: hop.token_in.clone(),
                token_out: hop.token_out.clone(),
                fee: hop.fee,
                amount_in: hop.amount_in,
                min_amount_out: request.min_amount_out(),
                state: HopState::Pending,
                tx_id: None,
                status: None,
                submitted_at: None,
            };

            let payload = match dex.build_swap_payload(&request).await {
                Ok(payload) => payload,
                Err(e) => {
                    error!(hop = hop_number, error = %e, "payload build failed");
                    hops.push(report);
                    return self.abort(hops, hop_number, e.to_string());
                }
            };
            report.state = HopState::PayloadBuilt;

            if self.dry_run {
                info!(
                    hop = hop_number,
                    pair = %format!("{}->{}", hop.token_in, hop.token_out),
                    min_out = %report.min_amount_out,
                    "dry run: hop not submitted"
                );
                hops.push(report);
                continue;
            }

            let signature = match signing::sign_payload(&payload, &self.private_key) {
                Ok(signature) => signature,
                Err(e) => {
                    error!(hop = hop_number, error = %e, "signing failed");
                    hops.push(report);
                    return self.abort(hops, hop_number, e.to_string());
                }
            };
            report.state = HopState::Signed;

            let mut tx_id = None;
            let mut last_error = String::new();
            for tx_type in TX_TYPE_CANDIDATES {
                match dex
                    .submit_bundle(&payload, tx_type, &signature, &self.user_address)
                    .await
                {
                    Ok(id) => {
                        tx_id = Some(id);
                        break;
                    }
                    Err(e) => {
                        warn!(hop = hop_number, tx_type, error = %e, "bundle rejected");
                        last_error = e.to_string();
                    }
                }
            }

            let Some(tx_id) = tx_id else {
                metrics::inc_hops_failed();
                hops.push(report);
                return self.abort(hops, hop_number, last_error);
            };

            report.state = HopState::Submitted;
            report.tx_id = Some(tx_id.clone());
            report.submitted_at = Some(Utc::now());
            metrics::inc_hops_submitted();
            self.stats.hops_submitted += 1;
            info!(hop = hop_number, tx_id = %tx_id, "hop submitted");

            if !self.settle_delay.is_zero() {
                tokio::time::sleep(self.settle_delay).await;
            }

            // Best effort; a failed poll never fails the hop.
            match dex.transaction_status(&tx_id).await {
                Ok(status) => {
                    report.state = HopState::StatusChecked;
                    report.status = status.status;
                }
                Err(e) => {
                    warn!(hop = hop_number, error = %e, "status check failed");
                }
            }

            hops.push(report);
        }

        if self.dry_run {
            self.stats.dry_runs += 1;
            self.stats.cycles_executed += 1;
            ExecutionOutcome::DryRun { hops }
        } else {
            metrics::inc_cycles_executed();
            self.stats.cycles_executed += 1;
            ExecutionOutcome::Completed { hops }
        }
    }

    fn abort(
        &mut self,
        hops: Vec<HopReport>,
        failed_hop: usize,
        reason: String,
    ) -> ExecutionOutcome {
        metrics::inc_cycles_aborted();
        self.stats.cycles_aborted += 1;
        error!(failed_hop, %reason, "cycle aborted; earlier hops stand");
        ExecutionOutcome::Aborted {
            hops,
            failed_hop,
            reason,
        }
    }
}
