//! GalaSwap REST API client.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{ExecutionError, QuoteError};
use crate::metrics;

use super::types::{
    decimal_from_json, ApiEnvelope, BundleData, Quote, QuoteData, SwapPayload, SwapRequest,
    TokenClassKey, TxStatus,
};
use super::Dex;

/// GalaSwap DEX API client.
#[derive(Debug, Clone)]
pub struct GalaSwapClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL for the DEX backend.
    base_url: String,
    /// Token symbol -> composite key table.
    token_keys: HashMap<String, String>,
    /// Per-pool fee overrides keyed by sorted pair.
    fee_overrides: HashMap<(String, String), Vec<u32>>,
    /// Global fallback fee tiers.
    fallback_fees: Vec<u32>,
}

impl GalaSwapClient {
    /// Create a new client from config with tuned HTTP settings.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(std::time::Duration::from_millis(2_000))
            .tcp_nodelay(true)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: config.gala_api_base_url.clone(),
            token_keys: config.token_key_map(),
            fee_overrides: config.fee_overrides(),
            fallback_fees: config.fallback_fees(),
        }
    }

    /// Get the DEX base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a token symbol to its composite key.
    fn composite_key(&self, symbol: &str) -> Result<&str, QuoteError> {
        self.token_keys
            .get(symbol)
            .map(String::as_str)
            .ok_or_else(|| QuoteError::UnknownToken(symbol.to_string()))
    }

    /// Candidate fee tiers for a pair (unordered override lookup, then the
    /// fallback list).
    fn fees_for_pair(&self, a: &str, b: &str) -> Vec<u32> {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.fee_overrides
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.fallback_fees.clone())
    }
}

impl Dex for GalaSwapClient {
    #[instrument(skip(self), fields(pair = %format!("{token_in}->{token_out}")))]
    async fn quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        fee: u32,
    ) -> Result<Quote, QuoteError> {
        let key_in = self.composite_key(token_in)?.to_string();
        let key_out = self.composite_key(token_out)?.to_string();

        let url = format!("{}/v1/trade/quote", self.base_url);
        let timer = metrics::timer_quote();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("tokenIn", key_in.as_str()),
                ("tokenOut", key_out.as_str()),
                ("amountIn", &amount_in.to_string()),
                ("fee", &fee.to_string()),
            ])
            .send()
            .await?;
        drop(timer);

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            debug!(status, "quote rejected");
            return Err(QuoteError::Api { status, body });
        }

        let envelope: ApiEnvelope<QuoteData> = response
            .json()
            .await
            .map_err(|e| QuoteError::Api {
                status: 200,
                body: format!("unparseable quote response: {e}"),
            })?;

        let data = envelope.data.unwrap_or(QuoteData {
            amount_out: None,
            fee: None,
        });
        let amount_out = data
            .amount_out
            .as_ref()
            .and_then(decimal_from_json)
            .unwrap_or(Decimal::ZERO);

        // Zero out means the pool exists but can't fill the probe.
        if amount_out <= Decimal::ZERO {
            return Err(QuoteError::NoLiquidity {
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
                fee: Some(fee),
            });
        }

        Ok(Quote {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            amount_out,
            fee: data.fee.unwrap_or(fee),
        })
    }

    async fn best_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> Result<Quote, QuoteError> {
        let mut best: Option<Quote> = None;
        for fee in self.fees_for_pair(token_in, token_out) {
            match self.quote(token_in, token_out, amount_in, fee).await {
                Ok(quote) => {
                    let better = best
                        .as_ref()
                        .map_or(true, |b| quote.amount_out > b.amount_out);
                    if better {
                        best = Some(quote);
                    }
                }
                Err(QuoteError::UnknownToken(sym)) => {
                    // Not a per-tier condition; no other tier can succeed.
                    return Err(QuoteError::UnknownToken(sym));
                }
                Err(e) => {
                    debug!(fee, error = %e, "fee tier skipped");
                }
            }
        }
        best.ok_or_else(|| QuoteError::NoLiquidity {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            fee: None,
        })
    }

    #[instrument(skip(self, request), fields(pair = %format!("{}->{}", request.token_in, request.token_out)))]
    async fn build_swap_payload(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapPayload, ExecutionError> {
        let to_exec = |e: QuoteError| ExecutionError::PayloadBuild {
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            reason: e.to_string(),
        };
        let key_in = self.composite_key(&request.token_in).map_err(to_exec)?;
        let token_in = TokenClassKey::parse(key_in).map_err(to_exec)?;
        let key_out = self.composite_key(&request.token_out).map_err(to_exec)?;
        let token_out = TokenClassKey::parse(key_out).map_err(to_exec)?;

        let body = serde_json::json!({
            "tokenIn": token_in,
            "tokenOut": token_out,
            "amountIn": request.amount_in.to_string(),
            "amountOut": request.quoted_out.to_string(),
            "fee": request.fee,
            "sqrtPriceLimit": "0",
            "amountInMaximum": request.max_amount_in().to_string(),
            "amountOutMinimum": request.min_amount_out().to_string(),
        });

        let url = format!("{}/v1/trade/swap", self.base_url);
        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::PayloadBuild {
                token_in: request.token_in.clone(),
                token_out: request.token_out.clone(),
                reason: format!("HTTP {status} - {body}"),
            });
        }

        let envelope: ApiEnvelope<SwapPayload> =
            response
                .json()
                .await
                .map_err(|e| ExecutionError::PayloadBuild {
                    token_in: request.token_in.clone(),
                    token_out: request.token_out.clone(),
                    reason: format!("unparseable swap response: {e}"),
                })?;

        envelope.data.ok_or_else(|| ExecutionError::PayloadBuild {
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            reason: "swap response carried no payload".to_string(),
        })
    }

    #[instrument(skip(self, payload, signature, user), fields(tx_type = %tx_type))]
    async fn submit_bundle(
        &self,
        payload: &SwapPayload,
        tx_type: &str,
        signature: &str,
        user: &str,
    ) -> Result<String, ExecutionError> {
        let body = serde_json::json!({
            "payload": payload,
            "type": tx_type,
            "signature": signature,
            "user": user,
        });

        let url = format!("{}/v1/trade/bundle", self.base_url);
        let timer = metrics::timer_bundle_submit();
        let response = self.http.post(&url).json(&body).send().await?;
        drop(timer);

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::BundleRejected {
                tx_type: tx_type.to_string(),
                reason: format!("HTTP {status} - {body}"),
            });
        }

        let envelope: ApiEnvelope<BundleData> =
            response
                .json()
                .await
                .map_err(|e| ExecutionError::BundleRejected {
                    tx_type: tx_type.to_string(),
                    reason: format!("unparseable bundle response: {e}"),
                })?;

        let tx_id = envelope.data.and_then(|d| d.data).unwrap_or_default();
        if tx_id.is_empty() {
            warn!("bundle accepted without a transaction id");
            return Err(ExecutionError::BundleRejected {
                tx_type: tx_type.to_string(),
                reason: "no transaction id in response".to_string(),
            });
        }

        Ok(tx_id)
    }

    async fn transaction_status(&self, tx_id: &str) -> Result<TxStatus, ExecutionError> {
        let url = format!("{}/v1/trade/transaction-status", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("id", tx_id)])
            .send()
            .await
            .map_err(|e| ExecutionError::StatusFailed {
                tx_id: tx_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ExecutionError::StatusFailed {
                tx_id: tx_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let envelope: ApiEnvelope<TxStatus> =
            response
                .json()
                .await
                .map_err(|e| ExecutionError::StatusFailed {
                    tx_id: tx_id.to_string(),
                    reason: format!("unparseable status response: {e}"),
                })?;

        Ok(envelope.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn client_creation_works() {
        let client = GalaSwapClient::new(&test_config());
        assert_eq!(client.base_url(), "https://test");
    }

    #[test]
    fn composite_key_lookup() {
        let client = GalaSwapClient::new(&test_config());
        assert_eq!(client.composite_key("GALA").unwrap(), "GALA$Unit$none$none");
        assert!(matches!(
            client.composite_key("DOGE"),
            Err(QuoteError::UnknownToken(_))
        ));
    }

    #[test]
    fn fees_for_pair_is_order_insensitive() {
        let config = crate::config::Config {
            pool_fee_overrides: "GALA/GUSDC=10000".to_string(),
            ..test_config()
        };
        let client = GalaSwapClient::new(&config);
        assert_eq!(client.fees_for_pair("GUSDC", "GALA"), vec![10000]);
        assert_eq!(client.fees_for_pair("GALA", "GUSDC"), vec![10000]);
        assert_eq!(client.fees_for_pair("GALA", "GWETH"), vec![500, 3000, 10000]);
    }
}
