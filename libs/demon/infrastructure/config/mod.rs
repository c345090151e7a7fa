//! Configuration loading
//!
//! The agent is configured from a YAML file. Exchange credentials never live
//! in the file; they come from the environment (see the Binance client).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::domain::order_tag::MAX_SYMBOL_LEN;
use crate::domain::PairState;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Upper bound for every configured delay or interval (one year)
const MAX_DURATION_SECS: f64 = 365.0 * 24.0 * 3600.0;

/// Whether orders actually reach the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    /// Compute and log quotes, never submit them
    #[default]
    #[serde(alias = "DRY_RUN")]
    DryRun,
    /// Submit quotes to the exchange
    #[serde(alias = "TRADE")]
    Trade,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::DryRun => write!(f, "DRY_RUN"),
            TradingMode::Trade => write!(f, "TRADE"),
        }
    }
}

/// Exchange connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            recv_window_ms: default_recv_window_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_recv_window_ms() -> u64 {
    5000
}

fn default_timeout_secs() -> u64 {
    10
}

/// One traded symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Exchange symbol, e.g. BTCUSDT
    pub symbol: String,
    /// Bid as a fraction of fair price (0 < buy_skew <= 1)
    pub buy_skew: f64,
    /// Ask as a multiple of fair price (sell_skew >= 1)
    pub sell_skew: f64,
    /// Base asset allotted to the bot when no saved state exists
    pub initial_base_qty: f64,
    /// Quote asset allotted to the bot when no saved state exists
    pub initial_quote_qty: f64,
    /// Trades with this id or lower are never reconciled
    #[serde(default)]
    pub from_trade_id: u64,
}

impl PairConfig {
    /// Ledger entry for a pair that has never been saved
    pub fn initial_state(&self) -> PairState {
        PairState::new(
            self.symbol.clone(),
            self.initial_base_qty,
            self.initial_quote_qty,
            self.buy_skew,
            self.sell_skew,
        )
        .with_cursor(self.from_trade_id)
    }

    fn validate(&self) -> Result<()> {
        let symbol = &self.symbol;
        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::ValidationError(format!(
                "symbol '{}' must be 1-{} alphanumeric characters",
                symbol, MAX_SYMBOL_LEN
            )));
        }
        if !(self.buy_skew > 0.0 && self.buy_skew <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "{}: buy_skew must be in (0, 1], got {}",
                symbol, self.buy_skew
            )));
        }
        if !(self.sell_skew >= 1.0 && self.sell_skew.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "{}: sell_skew must be >= 1, got {}",
                symbol, self.sell_skew
            )));
        }
        for (name, qty) in [("initial_base_qty", self.initial_base_qty), ("initial_quote_qty", self.initial_quote_qty)] {
            if !(qty.is_finite() && qty >= 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{}: {} must be a non-negative number, got {}",
                    symbol, name, qty
                )));
            }
        }
        Ok(())
    }
}

/// Main agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemonConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub mode: TradingMode,

    /// How long quotes rest on the book before being cancelled
    #[serde(default = "default_send_delay")]
    pub send_delay_secs: f64,

    /// Pause after cancelling before the next quote cycle
    #[serde(default = "default_cancel_delay")]
    pub cancel_delay_secs: f64,

    /// Special orders fire once per interval; absent disables them
    #[serde(default)]
    pub rebalance_interval_secs: Option<f64>,

    /// Stop if the very first quote cycle would trade through the market
    #[serde(default)]
    pub halt_on_first_cycle_market_hit: bool,

    /// Where the inventory ledger is persisted
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    #[serde(default)]
    pub exchange: ExchangeConfig,

    pub pairs: Vec<PairConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_send_delay() -> f64 {
    60.0
}

fn default_cancel_delay() -> f64 {
    5.0
}

fn default_state_path() -> PathBuf {
    PathBuf::from("state/ledger.json")
}

/// Clamps instead of panicking for values that bypassed `validate`
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

impl DemonConfig {
    /// Load configuration from YAML file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        Self::from_yaml_str(&yaml_content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: DemonConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one pair must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for pair in &self.pairs {
            pair.validate()?;
            if !seen.insert(pair.symbol.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate pair '{}'",
                    pair.symbol
                )));
            }
        }

        let durations = [
            ("send_delay_secs", Some(self.send_delay_secs)),
            ("cancel_delay_secs", Some(self.cancel_delay_secs)),
            ("rebalance_interval_secs", self.rebalance_interval_secs),
        ];
        for (name, secs) in durations {
            let Some(secs) = secs else { continue };
            if !(secs.is_finite() && (0.0..=MAX_DURATION_SECS).contains(&secs)) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be between 0 and {} seconds, got {}",
                    name, MAX_DURATION_SECS, secs
                )));
            }
        }

        if self.exchange.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "exchange.base_url cannot be empty".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn is_trading(&self) -> bool {
        self.mode == TradingMode::Trade
    }

    pub fn send_delay(&self) -> Duration {
        secs_to_duration(self.send_delay_secs)
    }

    pub fn cancel_delay(&self) -> Duration {
        secs_to_duration(self.cancel_delay_secs)
    }

    pub fn rebalance_interval(&self) -> Option<Duration> {
        self.rebalance_interval_secs.map(secs_to_duration)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.pairs.iter().map(|p| p.symbol.clone()).collect()
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Mode: {}", self.mode);
        info!("  Pairs: {}", self.symbols().join(", "));
        info!("  Send delay: {} seconds", self.send_delay_secs);
        info!("  Cancel delay: {} seconds", self.cancel_delay_secs);
        match self.rebalance_interval_secs {
            Some(secs) => info!("  Rebalance interval: {} seconds", secs),
            None => info!("  Rebalance interval: disabled"),
        }
        info!("  State file: {}", self.state_path.display());
        info!("  Exchange: {}", self.exchange.base_url);
        info!("  Log level: {}", self.log_level);
    }
}
