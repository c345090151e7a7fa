//! Collaborator ports consumed by the core
//!
//! The exchange, durable storage and the human-facing event sink are all
//! reached through these traits so the control loop can be driven by mocks.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{LimitOrder, MarketPrice, OpenOrder, PairState, Side, Trade};
use super::pair_metadata::PairMetadata;

/// Errors raised by an exchange client
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

impl ExchangeError {
    /// Authentication problems cannot fix themselves on the next cycle
    pub fn is_auth(&self) -> bool {
        matches!(self, ExchangeError::Auth(_))
    }
}

/// Exchange operations the control loop depends on
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Best bid and ask for a symbol
    async fn get_market_price(&self, symbol: &str) -> Result<MarketPrice, ExchangeError>;

    /// All fills for `symbol` with `id > since_id`, ascending by id
    async fn get_new_trades(&self, symbol: &str, since_id: u64) -> Result<Vec<Trade>, ExchangeError>;

    /// Tick/step rules for a symbol
    async fn get_pair_metadata(&self, symbol: &str) -> Result<PairMetadata, ExchangeError>;

    /// Every open order on the account for `symbol`
    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>, ExchangeError>;

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError>;

    async fn submit_limit_order(&self, order: &LimitOrder) -> Result<(), ExchangeError>;
}

/// Errors raised by a state store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("State file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable storage for the inventory ledger
pub trait StateStore: Send + Sync {
    /// Previously saved state, or `None` when nothing was saved yet
    fn load_state(&self) -> Result<Option<Vec<PairState>>, StoreError>;

    fn save_state(&self, pairs: &[PairState]) -> Result<(), StoreError>;
}

/// Human-readable events surfaced to the operator
#[derive(Debug, Clone, PartialEq)]
pub enum DemonEvent {
    TradeApplied {
        symbol: String,
        trade: Trade,
    },
    QuoteSubmitted {
        symbol: String,
        side: Side,
        price: f64,
        qty: f64,
        mid_price: f64,
        /// Display-only distance of mid from fair price, e.g. "+1.5%"
        distance: String,
        client_tag: String,
        dry_run: bool,
    },
    MarketHitWarning {
        symbol: String,
        mid_price: f64,
        target_bid: f64,
        target_ask: f64,
    },
    Error {
        symbol: Option<String>,
        message: String,
    },
}

impl DemonEvent {
    pub fn error(symbol: Option<&str>, message: impl Into<String>) -> Self {
        DemonEvent::Error {
            symbol: symbol.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Receiver of operator-facing events
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &DemonEvent);
}
