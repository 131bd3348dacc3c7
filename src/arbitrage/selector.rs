//! Opportunity selection: simulate candidate cycles, keep the strict best,
//! gate on the profit threshold.

use tracing::{debug, instrument};

use crate::config::Config;
use crate::exchange::Dex;
use crate::metrics;

use super::cycles::Cycle;
use super::simulator::{simulate_cycle, CycleResult};

/// Simulate up to `max_cycles_per_scan` cycles that start with the configured
/// start token and return the one with the strictly highest gross profit.
///
/// Ties keep the earliest cycle; simulation failures skip the cycle and never
/// abort the scan.
#[instrument(skip_all, fields(candidates = cycles.len()))]
pub async fn select_best_cycle<D: Dex>(
    dex: &D,
    cycles: &[Cycle],
    config: &Config,
) -> Option<CycleResult> {
    let mut best: Option<CycleResult> = None;

    for cycle in cycles.iter().take(config.max_cycles_per_scan) {
        if cycle.start() != config.start_token {
            continue;
        }

        match simulate_cycle(
            dex,
            cycle,
            &config.start_token,
            config.start_amount,
            config.hop_input_cap(),
        )
        .await
        {
            Ok(Some(result)) => {
                debug!(
                    cycle = %cycle,
                    gross_profit_bps = result.gross_profit_bps,
                    "cycle simulated"
                );
                let better = best
                    .as_ref()
                    .map_or(true, |b| result.gross_profit_bps > b.gross_profit_bps);
                if better {
                    best = Some(result);
                }
            }
            Ok(None) => {}
            Err(e) => {
                debug!(cycle = %cycle, error = %e, "cycle simulation failed");
            }
        }
    }

    best
}

/// Whether a simulated cycle clears the combined profit gate.
pub fn meets_threshold(result: &CycleResult, min_profit_bps: i64, profit_buffer_bps: i64) -> bool {
    let clears = result.gross_profit_bps >= min_profit_bps + profit_buffer_bps;
    if clears {
        metrics::inc_opportunities_detected();
    }
    clears
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::exchange::MockDex;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use smallvec::SmallVec;

    fn result_with_bps(bps: i64) -> CycleResult {
        CycleResult {
            hops: SmallVec::new(),
            start_token: "GUSDC".to_string(),
            start_amount: dec!(100),
            final_amount: dec!(100),
            gross_profit_bps: bps,
        }
    }

    #[test]
    fn threshold_is_minimum_plus_buffer() {
        assert!(!meets_threshold(&result_with_bps(29), 20, 10));
        assert!(meets_threshold(&result_with_bps(30), 20, 10));
        assert!(meets_threshold(&result_with_bps(31), 20, 10));
    }

    fn scripted_triangle(dex: &MockDex, via: &str, closing_rate: rust_decimal::Decimal) {
        let other = if via == "GALA" { "GWETH" } else { "GALA" };
        dex.set_rate("GUSDC", via, 500, dec!(1));
        dex.set_rate(via, other, 500, dec!(1));
        dex.set_rate(other, "GUSDC", 500, closing_rate);
    }

    #[tokio::test]
    async fn strictly_best_cycle_wins() {
        let dex = MockDex::new();
        scripted_triangle(&dex, "GALA", dec!(1.002));
        scripted_triangle(&dex, "GWETH", dec!(1.005));

        let cycles = vec![
            Cycle::new("GUSDC", "GALA", "GWETH"),
            Cycle::new("GUSDC", "GWETH", "GALA"),
        ];
        let best = select_best_cycle(&dex, &cycles, &test_config()).await.unwrap();
        assert_eq!(best.hops[0].token_out, "GWETH");
        assert_eq!(best.gross_profit_bps, 50);
    }

    #[tokio::test]
    async fn tie_keeps_the_first_cycle() {
        let dex = MockDex::new();
        scripted_triangle(&dex, "GALA", dec!(1.005));
        scripted_triangle(&dex, "GWETH", dec!(1.005));

        let cycles = vec![
            Cycle::new("GUSDC", "GALA", "GWETH"),
            Cycle::new("GUSDC", "GWETH", "GALA"),
        ];
        let best = select_best_cycle(&dex, &cycles, &test_config()).await.unwrap();
        assert_eq!(best.hops[0].token_out, "GALA");
    }

    #[tokio::test]
    async fn non_start_rotations_are_not_simulated() {
        let dex = MockDex::new();
        scripted_triangle(&dex, "GALA", dec!(1));

        let cycles = vec![
            Cycle::new("GALA", "GWETH", "GUSDC"),
            Cycle::new("GWETH", "GUSDC", "GALA"),
        ];
        let best = select_best_cycle(&dex, &cycles, &test_config()).await;
        assert_eq!(best, None);
        assert!(dex.probes().is_empty());
    }

    #[tokio::test]
    async fn scan_cap_limits_simulations() {
        let dex = MockDex::new();
        scripted_triangle(&dex, "GALA", dec!(1.01));

        let config = crate::config::Config {
            max_cycles_per_scan: 1,
            ..test_config()
        };
        let cycles = vec![
            Cycle::new("GUSDC", "GWETH", "GALA"),
            Cycle::new("GUSDC", "GALA", "GWETH"),
        ];
        // Only the first (unprofitable, unscripted) cycle is inside the cap.
        let best = select_best_cycle(&dex, &cycles, &config).await;
        assert!(best.is_none());
    }

    #[tokio::test]
    async fn failed_simulations_are_skipped() {
        let dex = MockDex::new();
        scripted_triangle(&dex, "GALA", dec!(1.01));
        dex.fail_pair("GUSDC", "GWETH");

        let cycles = vec![
            Cycle::new("GUSDC", "GWETH", "GALA"),
            Cycle::new("GUSDC", "GALA", "GWETH"),
        ];
        let best = select_best_cycle(&dex, &cycles, &test_config()).await.unwrap();
        assert_eq!(best.hops[0].token_out, "GALA");
    }
}
