//! Pool discovery: probing configured pools for live, quotable edges.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::exchange::Dex;
use crate::metrics;

/// One directed, liquid pool edge at a specific fee tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolEdge {
    /// Input token symbol.
    pub token_in: String,
    /// Output token symbol.
    pub token_out: String,
    /// Fee tier (hundredths of a bip).
    pub fee: u32,
}

/// Probe every configured pool in both directions across its candidate fee
/// tiers and collect the edges that currently quote a positive output.
///
/// The two directions of a pool are probed independently; one direction can
/// be live while the other is not. Duplicate configuration entries are probed
/// once. Probe failures only drop the edge, never the discovery pass; an
/// empty result is a valid outcome.
#[instrument(skip(dex, config))]
pub async fn discover_active_edges<D: Dex>(dex: &D, config: &Config) -> Vec<PoolEdge> {
    let amount = config.liquidity_check_amount;
    let mut seen: HashSet<(String, String, u32)> = HashSet::new();
    let mut edges = Vec::new();

    for (a, b) in config.pool_pairs() {
        let fees = config.candidate_fees(&a, &b);
        for (token_in, token_out) in [(&a, &b), (&b, &a)] {
            for &fee in &fees {
                let key = (token_in.clone(), token_out.clone(), fee);
                if !seen.insert(key) {
                    continue;
                }

                metrics::inc_pool_probes();
                match dex.quote(token_in, token_out, amount, fee).await {
                    Ok(quote) => {
                        info!(
                            pair = %format!("{token_in}->{token_out}"),
                            fee,
                            amount_out = %quote.amount_out,
                            "pool edge active"
                        );
                        edges.push(PoolEdge {
                            token_in: token_in.clone(),
                            token_out: token_out.clone(),
                            fee,
                        });
                    }
                    Err(e) => {
                        debug!(
                            pair = %format!("{token_in}->{token_out}"),
                            fee,
                            error = %e,
                            "pool edge inactive"
                        );
                    }
                }
            }
        }
    }

    info!(active_edges = edges.len(), "pool discovery finished");
    edges
}

/// Configured pairs with no active edge in either direction, for startup
/// diagnostics.
pub fn inactive_pairs(edges: &[PoolEdge], pairs: &[(String, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .filter(|(a, b)| {
            !edges.iter().any(|e| {
                (e.token_in == *a && e.token_out == *b) || (e.token_in == *b && e.token_out == *a)
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::exchange::MockDex;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn directions_are_probed_independently() {
        let dex = MockDex::new();
        dex.set_rate("GUSDC", "GALA", 500, dec!(2));
        // GALA -> GUSDC is never scripted, so that direction stays inactive.
        let config = crate::config::Config {
            pools: "GUSDC/GALA".to_string(),
            fallback_fee_tiers: "500".to_string(),
            ..test_config()
        };

        let edges = discover_active_edges(&dex, &config).await;
        assert_eq!(
            edges,
            vec![PoolEdge {
                token_in: "GUSDC".to_string(),
                token_out: "GALA".to_string(),
                fee: 500,
            }]
        );
    }

    #[tokio::test]
    async fn duplicate_pool_entries_are_probed_once() {
        let dex = MockDex::new();
        dex.set_rate("GUSDC", "GALA", 500, dec!(2));
        dex.set_rate("GALA", "GUSDC", 500, dec!(0.5));
        let config = crate::config::Config {
            pools: "GUSDC/GALA,GALA/GUSDC,GUSDC/GALA".to_string(),
            fallback_fee_tiers: "500".to_string(),
            ..test_config()
        };

        let edges = discover_active_edges(&dex, &config).await;
        assert_eq!(edges.len(), 2);
        // One probe per direction per fee, despite three config entries.
        assert_eq!(dex.probes().len(), 2);
    }

    #[tokio::test]
    async fn every_fee_tier_is_probed() {
        let dex = MockDex::new();
        dex.set_rate("GUSDC", "GALA", 3000, dec!(2));
        let config = crate::config::Config {
            pools: "GUSDC/GALA".to_string(),
            ..test_config()
        };

        let edges = discover_active_edges(&dex, &config).await;
        // Three fallback tiers, two directions.
        assert_eq!(dex.probes().len(), 6);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].fee, 3000);
    }

    #[tokio::test]
    async fn discovery_degrades_to_empty() {
        let dex = MockDex::new();
        let edges = discover_active_edges(&dex, &test_config()).await;
        assert!(edges.is_empty());
    }

    #[test]
    fn inactive_pairs_reports_dead_pools() {
        let edges = vec![PoolEdge {
            token_in: "GUSDC".to_string(),
            token_out: "GALA".to_string(),
            fee: 500,
        }];
        let pairs = vec![
            ("GUSDC".to_string(), "GALA".to_string()),
            ("GALA".to_string(), "GWETH".to_string()),
        ];
        assert_eq!(
            inactive_pairs(&edges, &pairs),
            vec![("GALA".to_string(), "GWETH".to_string())]
        );
    }
}
