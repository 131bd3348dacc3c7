//! Mock exchange for unit testing.
//!
//! This module provides a scripted [`Dex`] implementation that can be used in
//! tests without making real network requests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use crate::error::{ExecutionError, QuoteError};

use super::types::{Quote, SwapPayload, SwapRequest, TokenClassKey, TxStatus};
use super::Dex;

/// One recorded quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteProbe {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Specific fee tier, `None` for best-quote requests.
    pub fee: Option<u32>,
    /// Requested input amount.
    pub amount_in: Decimal,
}

/// One recorded bundle submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBundle {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Transaction type label used.
    pub tx_type: String,
    /// Assigned transaction id.
    pub tx_id: String,
    /// Minimum-output bound carried by the payload.
    pub min_amount_out: String,
}

/// Configuration for mock failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockDexConfig {
    /// Whether payload building fails.
    pub fail_payload_build: bool,
    /// Whether status lookups fail.
    pub fail_status: bool,
}

/// Scripted exchange for testing.
///
/// Quotes are rate-based: `amount_out = amount_in * rate` for the scripted
/// `(token_in, token_out, fee)` combination. Pairs can be failed outright or
/// given a liquidity ceiling above which quotes fail (to exercise backoff).
#[derive(Debug, Clone, Default)]
pub struct MockDex {
    config: MockDexConfig,
    /// Scripted rates per directed pair, in fee insertion order.
    rates: Arc<Mutex<HashMap<(String, String), Vec<(u32, Decimal)>>>>,
    /// Directed pairs that always fail to quote.
    failing_pairs: Arc<Mutex<HashSet<(String, String)>>>,
    /// Directed pairs whose quotes fail above a maximum input amount.
    liquidity_limits: Arc<Mutex<HashMap<(String, String), Decimal>>>,
    /// Directed pairs whose submissions are rejected under every label.
    failing_submissions: Arc<Mutex<HashSet<(String, String)>>>,
    /// Transaction type labels the exchange accepts.
    accepted_labels: Arc<Mutex<HashSet<String>>>,
    /// Every quote request observed.
    probes: Arc<Mutex<Vec<QuoteProbe>>>,
    /// Every accepted submission.
    submissions: Arc<Mutex<Vec<SubmittedBundle>>>,
    /// Rejected-label attempts, in order.
    rejected_labels: Arc<Mutex<Vec<String>>>,
    next_tx_id: Arc<Mutex<u64>>,
}

impl MockDex {
    /// Create a new mock with default configuration (accepts "swap"/"Swap").
    pub fn new() -> Self {
        let dex = Self::default();
        dex.accepted_labels
            .lock()
            .unwrap()
            .extend(["swap".to_string(), "Swap".to_string()]);
        dex
    }

    /// Create a mock with custom failure configuration.
    pub fn with_config(config: MockDexConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Script a quote rate for a directed pair at one fee tier.
    pub fn set_rate(&self, token_in: &str, token_out: &str, fee: u32, rate: Decimal) {
        self.rates
            .lock()
            .unwrap()
            .entry(pair(token_in, token_out))
            .or_default()
            .push((fee, rate));
    }

    /// Make every quote for a directed pair fail.
    pub fn fail_pair(&self, token_in: &str, token_out: &str) {
        self.failing_pairs
            .lock()
            .unwrap()
            .insert(pair(token_in, token_out));
    }

    /// Fail quotes for a directed pair when the input exceeds `max_in`.
    pub fn set_liquidity_limit(&self, token_in: &str, token_out: &str, max_in: Decimal) {
        self.liquidity_limits
            .lock()
            .unwrap()
            .insert(pair(token_in, token_out), max_in);
    }

    /// Reject every submission whose payload trades the directed pair.
    pub fn fail_submission(&self, token_in: &str, token_out: &str) {
        self.failing_submissions
            .lock()
            .unwrap()
            .insert(pair(token_in, token_out));
    }

    /// Replace the set of accepted transaction-type labels.
    pub fn set_accepted_labels(&self, labels: &[&str]) {
        let mut accepted = self.accepted_labels.lock().unwrap();
        accepted.clear();
        accepted.extend(labels.iter().map(|l| l.to_string()));
    }

    /// All recorded quote requests.
    pub fn probes(&self) -> Vec<QuoteProbe> {
        self.probes.lock().unwrap().clone()
    }

    /// Best-quote request amounts for one directed pair, in order.
    pub fn best_quote_amounts(&self, token_in: &str, token_out: &str) -> Vec<Decimal> {
        self.probes
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.fee.is_none() && p.token_in == token_in && p.token_out == token_out)
            .map(|p| p.amount_in)
            .collect()
    }

    /// All accepted submissions, in order.
    pub fn submissions(&self) -> Vec<SubmittedBundle> {
        self.submissions.lock().unwrap().clone()
    }

    /// Labels rejected during submission, in order.
    pub fn rejected_labels(&self) -> Vec<String> {
        self.rejected_labels.lock().unwrap().clone()
    }

    fn check_quota(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        fee: Option<u32>,
    ) -> Result<(), QuoteError> {
        let key = pair(token_in, token_out);
        if self.failing_pairs.lock().unwrap().contains(&key) {
            return Err(no_liquidity(token_in, token_out, fee));
        }
        if let Some(limit) = self.liquidity_limits.lock().unwrap().get(&key) {
            if amount_in > *limit {
                return Err(no_liquidity(token_in, token_out, fee));
            }
        }
        Ok(())
    }
}

impl Dex for MockDex {
    async fn quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        fee: u32,
    ) -> Result<Quote, QuoteError> {
        self.probes.lock().unwrap().push(QuoteProbe {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            fee: Some(fee),
            amount_in,
        });

        self.check_quota(token_in, token_out, amount_in, Some(fee))?;

        let rates = self.rates.lock().unwrap();
        let rate = rates
            .get(&pair(token_in, token_out))
            .and_then(|tiers| tiers.iter().find(|(f, _)| *f == fee))
            .map(|(_, rate)| *rate)
            .ok_or_else(|| no_liquidity(token_in, token_out, Some(fee)))?;

        Ok(Quote {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            amount_out: amount_in * rate,
            fee,
        })
    }

    async fn best_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> Result<Quote, QuoteError> {
        self.probes.lock().unwrap().push(QuoteProbe {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            fee: None,
            amount_in,
        });

        self.check_quota(token_in, token_out, amount_in, None)?;

        let tiers = self
            .rates
            .lock()
            .unwrap()
            .get(&pair(token_in, token_out))
            .cloned()
            .unwrap_or_default();

        let mut best: Option<Quote> = None;
        for (fee, rate) in tiers {
            let amount_out = amount_in * rate;
            let better = best.as_ref().map_or(true, |b| amount_out > b.amount_out);
            if better {
                best = Some(Quote {
                    token_in: token_in.to_string(),
                    token_out: token_out.to_string(),
                    amount_in,
                    amount_out,
                    fee,
                });
            }
        }
        best.ok_or_else(|| no_liquidity(token_in, token_out, None))
    }

    async fn build_swap_payload(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapPayload, ExecutionError> {
        if self.config.fail_payload_build {
            return Err(ExecutionError::PayloadBuild {
                token_in: request.token_in.clone(),
                token_out: request.token_out.clone(),
                reason: "mock payload failure".to_string(),
            });
        }

        Ok(SwapPayload {
            token_in: mock_class_key(&request.token_in),
            token_out: mock_class_key(&request.token_out),
            amount_in: request.amount_in.to_string(),
            amount_out: request.quoted_out.to_string(),
            fee: request.fee,
            sqrt_price_limit: "0".to_string(),
            amount_in_maximum: request.max_amount_in().to_string(),
            amount_out_minimum: request.min_amount_out().to_string(),
            unique_key: Some(format!(
                "mock-{}-{}-{}",
                request.token_in, request.token_out, request.fee
            )),
            signature: None,
            trace: None,
            extra: serde_json::Map::new(),
        })
    }

    async fn submit_bundle(
        &self,
        payload: &SwapPayload,
        tx_type: &str,
        _signature: &str,
        _user: &str,
    ) -> Result<String, ExecutionError> {
        let key = (
            payload.token_in.collection.clone(),
            payload.token_out.collection.clone(),
        );

        let label_accepted = self.accepted_labels.lock().unwrap().contains(tx_type);
        if !label_accepted || self.failing_submissions.lock().unwrap().contains(&key) {
            self.rejected_labels.lock().unwrap().push(tx_type.to_string());
            return Err(ExecutionError::BundleRejected {
                tx_type: tx_type.to_string(),
                reason: "mock submission rejected".to_string(),
            });
        }

        let mut counter = self.next_tx_id.lock().unwrap();
        *counter += 1;
        let tx_id = format!("mock-tx-{}", *counter);

        self.submissions.lock().unwrap().push(SubmittedBundle {
            token_in: key.0,
            token_out: key.1,
            tx_type: tx_type.to_string(),
            tx_id: tx_id.clone(),
            min_amount_out: payload.amount_out_minimum.clone(),
        });

        Ok(tx_id)
    }

    async fn transaction_status(&self, tx_id: &str) -> Result<TxStatus, ExecutionError> {
        if self.config.fail_status {
            return Err(ExecutionError::StatusFailed {
                tx_id: tx_id.to_string(),
                reason: "mock status failure".to_string(),
            });
        }

        Ok(TxStatus {
            status: Some("PROCESSED".to_string()),
            method: Some("Swap".to_string()),
        })
    }
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

fn no_liquidity(token_in: &str, token_out: &str, fee: Option<u32>) -> QuoteError {
    QuoteError::NoLiquidity {
        token_in: token_in.to_string(),
        token_out: token_out.to_string(),
        fee,
    }
}

fn mock_class_key(symbol: &str) -> TokenClassKey {
    TokenClassKey {
        collection: symbol.to_string(),
        category: "Unit".to_string(),
        token_type: "none".to_string(),
        additional_key: "none".to_string(),
    }
}
