//! GalaSwap exchange access: wire types, REST client, and test mock.

pub mod client;
pub mod mock;
pub mod types;

pub use client::GalaSwapClient;
pub use mock::MockDex;
pub use types::{Quote, SwapPayload, SwapRequest, TokenClassKey, TxStatus};

use rust_decimal::Decimal;

use crate::error::{ExecutionError, QuoteError};

/// Operations the arbitrage core needs from the exchange.
///
/// Implemented by [`GalaSwapClient`] for production and [`MockDex`] for tests.
/// The bot is strictly sequential, so these futures don't need to be `Send`.
#[allow(async_fn_in_trait)]
pub trait Dex {
    /// Quote a swap at one specific fee tier.
    async fn quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        fee: u32,
    ) -> Result<Quote, QuoteError>;

    /// Quote a swap across every candidate fee tier for the pair, returning
    /// the quote with the strictly largest output. Ties keep the first tier.
    async fn best_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
    ) -> Result<Quote, QuoteError>;

    /// Build the signable swap payload for one hop, including the
    /// slippage-derived min-output and max-input bounds.
    async fn build_swap_payload(&self, request: &SwapRequest)
        -> Result<SwapPayload, ExecutionError>;

    /// Submit a signed payload under the given transaction-type label.
    /// Returns the transaction id on acceptance.
    async fn submit_bundle(
        &self,
        payload: &SwapPayload,
        tx_type: &str,
        signature: &str,
        user: &str,
    ) -> Result<String, ExecutionError>;

    /// Look up the status of a submitted transaction (best effort).
    async fn transaction_status(&self, tx_id: &str) -> Result<TxStatus, ExecutionError>;
}
