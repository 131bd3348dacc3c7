//! Triangular arbitrage bot for the GalaSwap DEX.
//!
//! The bot repeatedly scans a small set of configured pools for profitable
//! three-hop cycles that start and end in the same token:
//!
//! ```text
//! GUSDC --> GALA --> GWETH --> GUSDC
//! 100.00     245.1     0.0612    100.53  (+53 bps gross)
//! ```
//!
//! Each scan discovers which pool directions currently quote, enumerates the
//! directed triangles they close, simulates every candidate with exact
//! decimal arithmetic, and executes the single best cycle when it clears the
//! profit threshold. Execution is non-atomic: hops are independent on-chain
//! swaps submitted one after another, and a failed hop strands the position
//! in an intermediate token.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`exchange`]: GalaSwap wire types, REST client, and test mock
//! - [`arbitrage`]: Discovery, enumeration, simulation, selection, execution
//! - [`signing`]: GalaChain payload signing
//! - [`api`]: HTTP API for health/status
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod arbitrage;
pub mod config;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod signing;
pub mod utils;

pub use config::Config;
pub use error::{BotError, Result};
