//! Arbitrage core: pool discovery, cycle enumeration, simulation, selection,
//! and execution.

pub mod cycles;
pub mod executor;
pub mod graph;
pub mod selector;
pub mod simulator;

pub use cycles::{enumerate_cycles, Cycle};
pub use executor::{BotStats, CycleExecutor, ExecutionOutcome, HopReport, HopState};
pub use graph::{discover_active_edges, inactive_pairs, PoolEdge};
pub use selector::{meets_threshold, select_best_cycle};
pub use simulator::{gross_profit_bps, simulate_cycle, CycleResult, Hop};
