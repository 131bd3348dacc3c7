//! Unified error types for the arbitrage bot.

use thiserror::Error;

/// Unified error type for the arbitrage bot.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Quote/liquidity error.
    #[error("quote error: {0}")]
    Quote(#[from] QuoteError),

    /// Execution pipeline error.
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Quote and liquidity-probe errors.
///
/// These are expected and frequent: every variant is recovered by excluding a
/// pool/fee combination or by the simulator's backoff ladder. None of them is
/// ever fatal to the scan loop.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// No composite key configured for a token symbol.
    #[error("no composite key configured for token symbol '{0}'")]
    UnknownToken(String),

    /// The exchange returned no usable price for this pair/fee.
    #[error("no liquidity for {token_in}->{token_out} (fee: {fee:?})")]
    NoLiquidity {
        /// Input token symbol.
        token_in: String,
        /// Output token symbol.
        token_out: String,
        /// Fee tier probed, if a specific one was requested.
        fee: Option<u32>,
    },

    /// The quote endpoint rejected the request.
    #[error("quote request rejected: HTTP {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Malformed composite token key.
    #[error("unexpected composite key format: {0}")]
    BadCompositeKey(String),

    /// Transport failure (timeout, connect error). Treated like a liquidity
    /// miss for the attempt that produced it.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Execution pipeline errors.
///
/// A failing hop aborts only the current cycle's remaining hops; already
/// submitted hops are never rolled back.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Swap payload construction failed.
    #[error("payload build failed for {token_in}->{token_out}: {reason}")]
    PayloadBuild {
        /// Input token symbol.
        token_in: String,
        /// Output token symbol.
        token_out: String,
        /// Reason for failure.
        reason: String,
    },

    /// Signing error.
    #[error("signing error: {0}")]
    Signing(String),

    /// The exchange rejected a signed bundle under one tx-type label.
    #[error("bundle rejected (type '{tx_type}'): {reason}")]
    BundleRejected {
        /// Transaction type label that was tried.
        tx_type: String,
        /// Rejection reason from the exchange.
        reason: String,
    },

    /// Transaction status lookup failed. Informational only; never aborts a
    /// submitted hop.
    #[error("status check failed for {tx_id}: {reason}")]
    StatusFailed {
        /// Transaction id.
        tx_id: String,
        /// Reason for failure.
        reason: String,
    },

    /// Transport failure during submission.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
