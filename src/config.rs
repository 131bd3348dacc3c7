//! Application configuration loaded from environment variables.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === GalaSwap Endpoints ===
    /// Base URL of the GalaSwap DEX backend.
    #[serde(default = "default_api_base_url")]
    pub gala_api_base_url: String,

    // === Wallet Credentials ===
    /// Wallet private key (hex, starts with 0x). Required for live execution.
    #[serde(default)]
    pub gala_private_key: String,

    /// GalaChain user address (starts with "eth|"). Always required.
    #[serde(default)]
    pub gala_user_address: String,

    // === Tokens and Pools ===
    /// Token symbol table, "SYM=COLLECTION$CATEGORY$TYPE$ADDITIONALKEY" pairs
    /// separated by commas. Aliases may map to the same composite key.
    #[serde(default = "default_token_keys")]
    pub token_keys: String,

    /// Unordered pool list, "A/B" pairs separated by commas.
    #[serde(default = "default_pools")]
    pub pools: String,

    /// Fee tiers (hundredths of a bip) probed when a pool has no override.
    #[serde(default = "default_fee_tiers")]
    pub fallback_fee_tiers: String,

    /// Per-pool fee overrides, "A/B=500|3000" entries separated by commas.
    /// Lookup is unordered: an override for A/B also applies to B/A.
    #[serde(default)]
    pub pool_fee_overrides: String,

    // === Risk Management ===
    /// Tolerated price movement between quote and execution, in bps.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,

    /// Minimum gross profit (bps) for a cycle to be considered.
    #[serde(default = "default_min_profit_bps")]
    pub min_profit_bps: i64,

    /// Extra safety buffer (bps) on top of the minimum profit.
    #[serde(default = "default_profit_buffer_bps")]
    pub profit_buffer_bps: i64,

    // === Strategy ===
    /// Token every arbitrage cycle starts and ends with.
    #[serde(default = "default_start_token")]
    pub start_token: String,

    /// Amount of the start token committed per cycle.
    #[serde(default = "default_start_amount")]
    pub start_amount: Decimal,

    /// Reference amount used for the liquidity probe during pool discovery.
    #[serde(default = "default_start_amount")]
    pub liquidity_check_amount: Decimal,

    /// Per-hop input cap. Zero disables the cap.
    #[serde(default)]
    pub max_hop_input: Decimal,

    // === Performance and Execution ===
    /// Simulation mode (no signing, no submission).
    #[serde(default = "default_true")]
    pub dry_run: bool,

    /// Maximum cycles simulated in a single scan.
    #[serde(default = "default_max_cycles")]
    pub max_cycles_per_scan: usize,

    /// Seconds between scans.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_seconds: u64,

    /// Scans between pool-discovery refreshes.
    #[serde(default = "default_pool_refresh_interval")]
    pub pool_refresh_interval: u64,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP server port for health/status endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_api_base_url() -> String {
    "https://dex-backend-test1.defi.gala.com".to_string()
}

fn default_token_keys() -> String {
    [
        "GALA=GALA$Unit$none$none",
        "GUSDC=GUSDC$Unit$none$none",
        "USDC=GUSDC$Unit$none$none",
        "GUSDT=GUSDT$Unit$none$none",
        "USDT=GUSDT$Unit$none$none",
        "GWETH=GWETH$Unit$none$none",
    ]
    .join(",")
}

fn default_pools() -> String {
    "GUSDC/GALA,GUSDT/GALA,GALA/GWETH,GWETH/GUSDC".to_string()
}

fn default_fee_tiers() -> String {
    "500,3000,10000".to_string()
}

fn default_slippage_bps() -> u32 {
    40 // 0.40%
}

fn default_min_profit_bps() -> i64 {
    20 // 0.20%
}

fn default_profit_buffer_bps() -> i64 {
    10 // 0.10%
}

fn default_start_token() -> String {
    "GUSDC".to_string()
}

fn default_start_amount() -> Decimal {
    Decimal::new(100, 0)
}

fn default_true() -> bool {
    true
}

fn default_max_cycles() -> usize {
    12
}

fn default_scan_interval() -> u64 {
    15
}

fn default_pool_refresh_interval() -> u64 {
    10
}

fn default_http_timeout_ms() -> u64 {
    15_000
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    ///
    /// A failure here is fatal: the process must abort before any scanning
    /// begins.
    pub fn validate(&self) -> Result<(), String> {
        if self.gala_user_address.is_empty() {
            return Err("GALA_USER_ADDRESS is required".to_string());
        }

        if !self.dry_run {
            if self.gala_private_key.is_empty() {
                return Err("GALA_PRIVATE_KEY is required for live execution".to_string());
            }
            if !self.gala_private_key.starts_with("0x") {
                return Err("GALA_PRIVATE_KEY must start with 0x".to_string());
            }
        }

        if self.start_amount <= Decimal::ZERO {
            return Err("START_AMOUNT must be positive".to_string());
        }

        if self.liquidity_check_amount <= Decimal::ZERO {
            return Err("LIQUIDITY_CHECK_AMOUNT must be positive".to_string());
        }

        if self.max_hop_input < Decimal::ZERO {
            return Err("MAX_HOP_INPUT must be zero or positive".to_string());
        }

        if self.slippage_bps >= 10_000 {
            return Err("SLIPPAGE_BPS must be below 10000".to_string());
        }

        if self.pool_refresh_interval == 0 {
            return Err("POOL_REFRESH_INTERVAL must be at least 1".to_string());
        }

        let tokens = self.token_key_map();
        if !tokens.contains_key(&self.start_token) {
            return Err(format!(
                "START_TOKEN '{}' has no entry in TOKEN_KEYS",
                self.start_token
            ));
        }

        let pairs = self.pool_pairs();
        if pairs.is_empty() {
            return Err("POOLS must name at least one A/B pair".to_string());
        }
        for (a, b) in &pairs {
            if a == b {
                return Err(format!("POOLS entry {a}/{b} pairs a token with itself"));
            }
            for token in [a, b] {
                if !tokens.contains_key(token) {
                    return Err(format!("POOLS names '{token}' missing from TOKEN_KEYS"));
                }
            }
        }

        if self.fallback_fees().is_empty() {
            return Err("FALLBACK_FEE_TIERS must name at least one fee tier".to_string());
        }

        Ok(())
    }

    /// Token symbol -> composite key table.
    pub fn token_key_map(&self) -> HashMap<String, String> {
        self.token_keys
            .split(',')
            .filter_map(|entry| {
                let (sym, key) = entry.trim().split_once('=')?;
                if sym.is_empty() || key.is_empty() {
                    return None;
                }
                Some((sym.to_string(), key.to_string()))
            })
            .collect()
    }

    /// Configured unordered pool pairs.
    pub fn pool_pairs(&self) -> Vec<(String, String)> {
        self.pools
            .split(',')
            .filter_map(|entry| {
                let (a, b) = entry.trim().split_once('/')?;
                if a.is_empty() || b.is_empty() {
                    return None;
                }
                Some((a.to_string(), b.to_string()))
            })
            .collect()
    }

    /// Global fallback fee tiers.
    pub fn fallback_fees(&self) -> Vec<u32> {
        self.fallback_fee_tiers
            .split(',')
            .filter_map(|f| f.trim().parse().ok())
            .collect()
    }

    /// Per-pool fee overrides keyed by the sorted (unordered) pair.
    pub fn fee_overrides(&self) -> HashMap<(String, String), Vec<u32>> {
        self.pool_fee_overrides
            .split(',')
            .filter_map(|entry| {
                let (pair, fees) = entry.trim().split_once('=')?;
                let (a, b) = pair.split_once('/')?;
                let fees: Vec<u32> = fees.split('|').filter_map(|f| f.trim().parse().ok()).collect();
                if fees.is_empty() {
                    return None;
                }
                Some((sorted_pair(a, b), fees))
            })
            .collect()
    }

    /// Candidate fee tiers for an unordered pair: explicit override first,
    /// global fallback otherwise.
    pub fn candidate_fees(&self, a: &str, b: &str) -> Vec<u32> {
        self.fee_overrides()
            .get(&sorted_pair(a, b))
            .cloned()
            .unwrap_or_else(|| self.fallback_fees())
    }

    /// Combined profit gate in bps: minimum profit plus safety buffer.
    pub fn profit_threshold_bps(&self) -> i64 {
        self.min_profit_bps + self.profit_buffer_bps
    }

    /// Per-hop input cap, `None` when disabled.
    pub fn hop_input_cap(&self) -> Option<Decimal> {
        if self.max_hop_input > Decimal::ZERO {
            Some(self.max_hop_input)
        } else {
            None
        }
    }
}

fn sorted_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        gala_api_base_url: "https://test".to_string(),
        gala_private_key: "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
            .to_string(),
        gala_user_address: "eth|0x1234567890abcdef1234567890abcdef12345678".to_string(),
        token_keys: default_token_keys(),
        pools: default_pools(),
        fallback_fee_tiers: default_fee_tiers(),
        pool_fee_overrides: String::new(),
        slippage_bps: default_slippage_bps(),
        min_profit_bps: default_min_profit_bps(),
        profit_buffer_bps: default_profit_buffer_bps(),
        start_token: default_start_token(),
        start_amount: default_start_amount(),
        liquidity_check_amount: default_start_amount(),
        max_hop_input: Decimal::ZERO,
        dry_run: true,
        max_cycles_per_scan: default_max_cycles(),
        scan_interval_seconds: default_scan_interval(),
        pool_refresh_interval: default_pool_refresh_interval(),
        http_timeout_ms: default_http_timeout_ms(),
        port: default_port(),
        rust_log: default_log_level(),
        verbose: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_slippage_bps(), 40);
        assert_eq!(default_min_profit_bps(), 20);
        assert_eq!(default_profit_buffer_bps(), 10);
        assert_eq!(default_start_token(), "GUSDC");
        assert!(default_true());
    }

    #[test]
    fn validate_accepts_test_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_requires_user_address() {
        let config = Config {
            gala_user_address: String::new(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_private_key_for_live_mode() {
        let config = Config {
            gala_private_key: String::new(),
            dry_run: false,
            ..test_config()
        };
        assert!(config.validate().is_err());

        // Dry run works without a key.
        let config = Config {
            gala_private_key: String::new(),
            dry_run: true,
            ..test_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_pool_token() {
        let config = Config {
            pools: "GUSDC/DOGE".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn pool_pairs_parse() {
        let config = test_config();
        let pairs = config.pool_pairs();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], ("GUSDC".to_string(), "GALA".to_string()));
    }

    #[test]
    fn token_key_map_resolves_aliases() {
        let map = test_config().token_key_map();
        assert_eq!(map.get("USDC"), Some(&"GUSDC$Unit$none$none".to_string()));
        assert_eq!(map.get("GUSDC"), Some(&"GUSDC$Unit$none$none".to_string()));
    }

    #[test]
    fn candidate_fees_prefer_override_in_either_order() {
        let config = Config {
            pool_fee_overrides: "GALA/GUSDC=3000".to_string(),
            ..test_config()
        };
        assert_eq!(config.candidate_fees("GUSDC", "GALA"), vec![3000]);
        assert_eq!(config.candidate_fees("GALA", "GUSDC"), vec![3000]);
        // No override: fallback list.
        assert_eq!(config.candidate_fees("GALA", "GWETH"), vec![500, 3000, 10000]);
    }

    #[test]
    fn profit_threshold_adds_buffer() {
        assert_eq!(test_config().profit_threshold_bps(), 30);
    }

    #[test]
    fn hop_input_cap_disabled_at_zero() {
        assert_eq!(test_config().hop_input_cap(), None);
        let config = Config {
            max_hop_input: Decimal::new(50, 0),
            ..test_config()
        };
        assert_eq!(config.hop_input_cap(), Some(Decimal::new(50, 0)));
    }
}
