//! Core domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pair_metadata::PairMetadata;

/// Side of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Single-letter code used inside order tags
    pub fn code(&self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
        }
    }

    /// Wire representation expected by the exchange
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top of book for a symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketPrice {
    pub bid_price: f64,
    pub ask_price: f64,
}

impl MarketPrice {
    pub fn new(bid_price: f64, ask_price: f64) -> Self {
        Self { bid_price, ask_price }
    }

    /// Both sides positive, finite and not crossed
    pub fn is_valid(&self) -> bool {
        self.bid_price.is_finite()
            && self.ask_price.is_finite()
            && self.bid_price > 0.0
            && self.ask_price >= self.bid_price
    }
}

/// A fill reported by the exchange. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique, totally ordered per symbol
    pub id: u64,
    pub order_id: u64,
    /// Client id of the order that produced this fill
    pub client_order_id: String,
    pub is_buyer: bool,
    pub price: f64,
    pub base_qty: f64,
    pub quote_qty: f64,
    pub time: DateTime<Utc>,
}

impl Trade {
    pub fn side(&self) -> Side {
        if self.is_buyer {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// Inventory ledger entry for one traded symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairState {
    pub symbol: String,
    pub base_qty: f64,
    pub quote_qty: f64,
    pub buy_skew: f64,
    pub sell_skew: f64,
    #[serde(default)]
    pub metadata: PairMetadata,
    /// Id of the last trade folded into the balances
    pub last_applied_trade_id: u64,
}

impl PairState {
    pub fn new(
        symbol: impl Into<String>,
        base_qty: f64,
        quote_qty: f64,
        buy_skew: f64,
        sell_skew: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            base_qty,
            quote_qty,
            buy_skew,
            sell_skew,
            metadata: PairMetadata::default(),
            last_applied_trade_id: 0,
        }
    }

    pub fn with_metadata(mut self, metadata: PairMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_cursor(mut self, last_applied_trade_id: u64) -> Self {
        self.last_applied_trade_id = last_applied_trade_id;
        self
    }

    /// Fold a fill into the balances and advance the cursor.
    ///
    /// Callers are responsible for ordering and for the `id > cursor` check;
    /// see `Ledger::apply_trades`.
    pub fn apply_trade(&mut self, trade: &Trade) {
        if trade.is_buyer {
            self.base_qty += trade.base_qty;
            self.quote_qty -= trade.quote_qty;
        } else {
            self.base_qty -= trade.base_qty;
            self.quote_qty += trade.quote_qty;
        }
        self.last_applied_trade_id = trade.id;
    }

    /// Quote value per unit of base held, if defined
    pub fn fair_price(&self) -> Option<f64> {
        if self.base_qty == 0.0 {
            return None;
        }
        let fair = self.quote_qty / self.base_qty;
        (fair.is_finite() && fair > 0.0).then_some(fair)
    }
}

/// A limit order ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct LimitOrder {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub qty: f64,
    pub client_tag: String,
}

impl LimitOrder {
    pub fn new(symbol: impl Into<String>, side: Side, price: f64, qty: f64, client_tag: String) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            price,
            qty,
            client_tag,
        }
    }

    pub fn notional(&self) -> f64 {
        self.price * self.qty
    }
}

/// An order resting on the exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOrder {
    pub order_id: u64,
    pub client_order_id: String,
}
