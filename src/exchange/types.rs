//! Wire types for the GalaSwap trade API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// GalaChain composite token key, e.g. `GALA$Unit$none$none`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClassKey {
    /// Token collection, e.g. "GALA".
    pub collection: String,
    /// Token category, e.g. "Unit".
    pub category: String,
    /// Token type.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Additional key component.
    pub additional_key: String,
}

impl TokenClassKey {
    /// Parse a `$`-separated composite key string.
    pub fn parse(composite: &str) -> Result<Self, QuoteError> {
        let parts: Vec<&str> = composite.split('$').collect();
        let [collection, category, token_type, additional_key] = parts[..] else {
            return Err(QuoteError::BadCompositeKey(composite.to_string()));
        };
        Ok(Self {
            collection: collection.to_string(),
            category: category.to_string(),
            token_type: token_type.to_string(),
            additional_key: additional_key.to_string(),
        })
    }
}

/// Result of probing one hop: what the exchange would pay out right now.
///
/// Ephemeral; produced and consumed within a single simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Input amount.
    pub amount_in: Decimal,
    /// Quoted output amount.
    pub amount_out: Decimal,
    /// Fee tier actually used.
    pub fee: u32,
}

/// Parameters for building one swap payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Input amount from the simulation.
    pub amount_in: Decimal,
    /// Quoted output amount from the simulation.
    pub quoted_out: Decimal,
    /// Fee tier.
    pub fee: u32,
    /// Slippage tolerance in bps.
    pub slippage_bps: u32,
}

impl SwapRequest {
    /// Minimum acceptable output: `quoted_out * (1 - slippage_bps/10000)`.
    pub fn min_amount_out(&self) -> Decimal {
        self.quoted_out * (Decimal::ONE - Decimal::new(self.slippage_bps as i64, 4))
    }

    /// Maximum acceptable input: `amount_in * (1 + slippage_bps/10000)`.
    pub fn max_amount_in(&self) -> Decimal {
        self.amount_in * (Decimal::ONE + Decimal::new(self.slippage_bps as i64, 4))
    }
}

/// Signable swap intent returned by the exchange.
///
/// Modelled as a structured record with named fields rather than an
/// open-ended map; fields the backend adds beyond these are preserved in
/// `extra` so the signed bytes match what the server issued. `signature` and
/// `trace` are transient and stripped before signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPayload {
    /// Input token class key.
    pub token_in: TokenClassKey,
    /// Output token class key.
    pub token_out: TokenClassKey,
    /// Input amount as a decimal string.
    pub amount_in: String,
    /// Quoted output amount as a decimal string.
    pub amount_out: String,
    /// Fee tier.
    pub fee: u32,
    /// Price limit; "0" means none.
    pub sqrt_price_limit: String,
    /// Slippage-bounded maximum input.
    pub amount_in_maximum: String,
    /// Slippage-bounded minimum output.
    pub amount_out_minimum: String,
    /// Server-issued uniqueness key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<String>,
    /// Transient: attached after signing, never part of the signed bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Transient: server-side trace data, never part of the signed bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<serde_json::Value>,
    /// Any additional fields the backend included.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SwapPayload {
    /// The minimum-output bound carried by the payload, if parseable.
    pub fn min_amount_out(&self) -> Option<Decimal> {
        self.amount_out_minimum.parse().ok()
    }
}

/// Transaction status record (best effort, informational).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxStatus {
    /// Status string, e.g. "PROCESSED".
    pub status: Option<String>,
    /// Method name the transaction resolved to.
    pub method: Option<String>,
}

/// Standard `{ "data": ... }` envelope on GalaSwap responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub data: Option<T>,
}

/// Quote endpoint response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteData {
    /// Output amount; the backend sends either a string or a number.
    pub amount_out: Option<serde_json::Value>,
    /// Fee tier actually quoted.
    pub fee: Option<u32>,
}

/// Bundle endpoint response body (`data.data` holds the transaction id).
#[derive(Debug, Deserialize)]
pub(crate) struct BundleData {
    pub data: Option<String>,
}

/// Parse a decimal from a JSON value that may be a string or a number.
pub(crate) fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    if let Some(s) = value.as_str() {
        return s.parse().ok();
    }
    if let Some(n) = value.as_f64() {
        return Decimal::try_from(n).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn composite_key_parses() {
        let key = TokenClassKey::parse("GALA$Unit$none$none").unwrap();
        assert_eq!(key.collection, "GALA");
        assert_eq!(key.category, "Unit");
        assert_eq!(key.token_type, "none");
        assert_eq!(key.additional_key, "none");
    }

    #[test]
    fn composite_key_rejects_wrong_arity() {
        assert!(TokenClassKey::parse("GALA$Unit$none").is_err());
        assert!(TokenClassKey::parse("GALA$Unit$none$none$extra").is_err());
    }

    #[test]
    fn slippage_bounds_are_exact() {
        let request = SwapRequest {
            token_in: "GUSDC".to_string(),
            token_out: "GALA".to_string(),
            amount_in: dec!(100),
            quoted_out: dec!(250),
            fee: 3000,
            slippage_bps: 40,
        };

        // 250 * (1 - 0.0040) and 100 * (1 + 0.0040), no float rounding.
        assert_eq!(request.min_amount_out(), dec!(249.0000));
        assert_eq!(request.max_amount_in(), dec!(100.4000));
    }

    #[test]
    fn payload_round_trips_with_extra_fields() {
        let json = serde_json::json!({
            "tokenIn": {"collection": "GUSDC", "category": "Unit", "type": "none", "additionalKey": "none"},
            "tokenOut": {"collection": "GALA", "category": "Unit", "type": "none", "additionalKey": "none"},
            "amountIn": "100",
            "amountOut": "250",
            "fee": 3000,
            "sqrtPriceLimit": "0",
            "amountInMaximum": "100.4",
            "amountOutMinimum": "249",
            "uniqueKey": "galaswap-operation-xyz",
            "serverOnlyField": 7
        });

        let payload: SwapPayload = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(payload.fee, 3000);
        assert_eq!(payload.unique_key.as_deref(), Some("galaswap-operation-xyz"));
        assert_eq!(payload.extra.get("serverOnlyField"), Some(&serde_json::json!(7)));
        assert_eq!(payload.min_amount_out(), Some(dec!(249)));

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn decimal_from_json_accepts_string_and_number() {
        assert_eq!(
            decimal_from_json(&serde_json::json!("10.5")),
            Some(dec!(10.5))
        );
        assert_eq!(decimal_from_json(&serde_json::json!(0)), Some(dec!(0)));
        assert_eq!(decimal_from_json(&serde_json::json!(null)), None);
    }
}
