//! Cycle simulation: chained quotes with per-hop liquidity backoff.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use smallvec::SmallVec;
use tracing::{debug, instrument};

use crate::error::QuoteError;
use crate::exchange::Dex;
use crate::metrics;

use super::cycles::Cycle;

/// Fractions of the hop input tried in order when a quote fails. The first
/// rung that quotes wins; exhausting the ladder fails the hop.
pub const BACKOFF_FRACTIONS: [Decimal; 5] =
    [dec!(1), dec!(0.5), dec!(0.2), dec!(0.1), dec!(0.05)];

/// Decimal places amounts are quantized to before quoting.
pub const AMOUNT_SCALE: u32 = 8;

/// One simulated hop of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Fee tier the best quote used.
    pub fee: u32,
    /// Input amount actually quoted (after backoff and capping).
    pub amount_in: Decimal,
    /// Quoted output amount.
    pub amount_out: Decimal,
}

/// Outcome of simulating a full cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    /// The three hops in execution order.
    pub hops: SmallVec<[Hop; 3]>,
    /// Start token symbol.
    pub start_token: String,
    /// Amount of the start token committed.
    pub start_amount: Decimal,
    /// Amount of the start token returned by the last hop.
    pub final_amount: Decimal,
    /// Gross profit in basis points, rounded toward negative infinity.
    pub gross_profit_bps: i64,
}

/// Gross profit in bps: `floor((final - start) / start * 10000)`.
pub fn gross_profit_bps(start: Decimal, final_amount: Decimal) -> i64 {
    let ratio = (final_amount - start) / start * dec!(10000);
    ratio.floor().to_i64().unwrap_or_else(|| {
        if ratio.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Quote one hop, backing off through [`BACKOFF_FRACTIONS`] until a quote
/// succeeds. Each attempt amount is quantized to [`AMOUNT_SCALE`] decimal
/// places; the ladder base is clamped to `cap` when one is set.
async fn quote_with_backoff<D: Dex>(
    dex: &D,
    token_in: &str,
    token_out: &str,
    amount: Decimal,
    cap: Option<Decimal>,
) -> Result<crate::exchange::Quote, QuoteError> {
    let base = match cap {
        Some(cap) if amount > cap => cap,
        _ => amount,
    };

    let mut last_error = None;
    for fraction in BACKOFF_FRACTIONS {
        let attempt = (base * fraction).round_dp(AMOUNT_SCALE);
        if attempt <= Decimal::ZERO {
            continue;
        }
        match dex.best_quote(token_in, token_out, attempt).await {
            Ok(quote) => {
                if fraction < Decimal::ONE {
                    debug!(
                        pair = %format!("{token_in}->{token_out}"),
                        fraction = %fraction,
                        amount = %attempt,
                        "hop filled after backoff"
                    );
                }
                return Ok(quote);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| QuoteError::NoLiquidity {
        token_in: token_in.to_string(),
        token_out: token_out.to_string(),
        fee: None,
    }))
}

/// Simulate one cycle starting from `start_token` with `start_amount`.
///
/// Returns `Ok(None)` when the cycle can't be evaluated (start token not a
/// member, or an amount goes non-positive) and `Err` when a hop exhausts its
/// backoff ladder.
#[instrument(skip(dex), fields(cycle = %cycle))]
pub async fn simulate_cycle<D: Dex>(
    dex: &D,
    cycle: &Cycle,
    start_token: &str,
    start_amount: Decimal,
    max_hop_input: Option<Decimal>,
) -> Result<Option<CycleResult>, QuoteError> {
    if start_amount <= Decimal::ZERO {
        return Ok(None);
    }
    let Some(rotated) = cycle.rotated_to(start_token) else {
        return Ok(None);
    };

    metrics::inc_cycles_simulated();

    let tokens = rotated.tokens();
    let mut hops: SmallVec<[Hop; 3]> = SmallVec::new();
    let mut amount = start_amount;

    for i in 0..3 {
        let token_in = &tokens[i];
        let token_out = &tokens[(i + 1) % 3];

        let quote = quote_with_backoff(dex, token_in, token_out, amount, max_hop_input).await?;
        if quote.amount_out <= Decimal::ZERO {
            return Ok(None);
        }

        amount = quote.amount_out;
        hops.push(Hop {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            fee: quote.fee,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
        });
    }

    Ok(Some(CycleResult {
        hops,
        start_token: start_token.to_string(),
        start_amount,
        final_amount: amount,
        gross_profit_bps: gross_profit_bps(start_amount, amount),
    }))
}
