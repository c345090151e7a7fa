//! Shared test doubles: scripted exchange, in-memory store, recording sink.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use demon::domain::{
    DemonEvent, EventSink, ExchangeClient, ExchangeError, LimitOrder, MarketPrice, OpenOrder, PairMetadata,
    PairState, Side, StateStore, StoreError, Trade,
};
use demon::{DemonConfig, ShutdownManager, StrategyContext};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Exchange whose responses are set up by the test
#[derive(Default)]
pub struct MockExchange {
    pub prices: Mutex<HashMap<String, MarketPrice>>,
    pub trades: Mutex<HashMap<String, Vec<Trade>>>,
    pub metadata: Mutex<HashMap<String, PairMetadata>>,
    pub open_orders: Mutex<HashMap<String, Vec<OpenOrder>>>,
    pub submitted: Mutex<Vec<LimitOrder>>,
    pub submit_attempts: Mutex<Vec<LimitOrder>>,
    pub cancelled: Mutex<Vec<(String, u64)>>,
    pub trade_fetches: Mutex<Vec<(String, u64)>>,
    pub fail_trades: Mutex<bool>,
    pub fail_prices: Mutex<Vec<String>>,
    pub fail_submits: Mutex<Vec<Side>>,
    pub reject_auth: Mutex<bool>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&self, symbol: &str, bid: f64, ask: f64) {
        self.prices.lock().insert(symbol.to_string(), MarketPrice::new(bid, ask));
    }

    pub fn set_metadata(&self, symbol: &str, metadata: PairMetadata) {
        self.metadata.lock().insert(symbol.to_string(), metadata);
    }

    pub fn push_trade(&self, symbol: &str, trade: Trade) {
        self.trades.lock().entry(symbol.to_string()).or_default().push(trade);
    }

    pub fn set_open_orders(&self, symbol: &str, orders: Vec<OpenOrder>) {
        self.open_orders.lock().insert(symbol.to_string(), orders);
    }

    pub fn submitted(&self) -> Vec<LimitOrder> {
        self.submitted.lock().clone()
    }

    pub fn submit_attempts(&self) -> Vec<LimitOrder> {
        self.submit_attempts.lock().clone()
    }

    pub fn set_fail_trades(&self, fail: bool) {
        *self.fail_trades.lock() = fail;
    }

    /// Book ticker requests for `symbol` fail until cleared
    pub fn fail_price(&self, symbol: &str) {
        self.fail_prices.lock().push(symbol.to_string());
    }

    pub fn clear_price_failures(&self) {
        self.fail_prices.lock().clear();
    }

    /// Order submissions on `side` are rejected
    pub fn fail_submit(&self, side: Side) {
        self.fail_submits.lock().push(side);
    }

    fn rate_limited() -> ExchangeError {
        ExchangeError::Api {
            code: -1003,
            message: "Too many requests".to_string(),
        }
    }

    pub fn cancelled(&self) -> Vec<(String, u64)> {
        self.cancelled.lock().clone()
    }

    fn check_auth(&self) -> Result<(), ExchangeError> {
        if *self.reject_auth.lock() {
            return Err(ExchangeError::Auth("Invalid API-key, IP, or permissions for action (-2015)".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn get_market_price(&self, symbol: &str) -> Result<MarketPrice, ExchangeError> {
        if self.fail_prices.lock().iter().any(|s| s == symbol) {
            return Err(Self::rate_limited());
        }
        self.prices
            .lock()
            .get(symbol)
            .copied()
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.to_string()))
    }

    async fn get_new_trades(&self, symbol: &str, since_id: u64) -> Result<Vec<Trade>, ExchangeError> {
        self.check_auth()?;
        self.trade_fetches.lock().push((symbol.to_string(), since_id));
        if *self.fail_trades.lock() {
            return Err(Self::rate_limited());
        }
        let mut trades: Vec<Trade> = self
            .trades
            .lock()
            .get(symbol)
            .map(|t| t.iter().filter(|t| t.id > since_id).cloned().collect())
            .unwrap_or_default();
        trades.sort_by_key(|t| t.id);
        Ok(trades)
    }

    async fn get_pair_metadata(&self, symbol: &str) -> Result<PairMetadata, ExchangeError> {
        self.metadata
            .lock()
            .get(symbol)
            .cloned()
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.to_string()))
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>, ExchangeError> {
        self.check_auth()?;
        Ok(self.open_orders.lock().get(symbol).cloned().unwrap_or_default())
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<(), ExchangeError> {
        self.check_auth()?;
        self.cancelled.lock().push((symbol.to_string(), order_id));
        if let Some(orders) = self.open_orders.lock().get_mut(symbol) {
            orders.retain(|o| o.order_id != order_id);
        }
        Ok(())
    }

    async fn submit_limit_order(&self, order: &LimitOrder) -> Result<(), ExchangeError> {
        self.check_auth()?;
        self.submit_attempts.lock().push(order.clone());
        if self.fail_submits.lock().contains(&order.side) {
            return Err(ExchangeError::Api {
                code: -2010,
                message: "Account has insufficient balance for requested action.".to_string(),
            });
        }
        self.submitted.lock().push(order.clone());
        Ok(())
    }
}

/// State store kept in memory, with switchable save failures
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Option<Vec<PairState>>>,
    pub saves: Mutex<usize>,
    pub fail_saves: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(pairs: Vec<PairState>) -> Self {
        let store = Self::default();
        *store.saved.lock() = Some(pairs);
        store
    }

    pub fn saved(&self) -> Option<Vec<PairState>> {
        self.saved.lock().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock()
    }
}

impl StateStore for MemoryStore {
    fn load_state(&self) -> Result<Option<Vec<PairState>>, StoreError> {
        Ok(self.saved.lock().clone())
    }

    fn save_state(&self, pairs: &[PairState]) -> Result<(), StoreError> {
        if *self.fail_saves.lock() {
            return Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
        }
        *self.saved.lock() = Some(pairs.to_vec());
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Sink that records every event; optionally requests shutdown on the first quote
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<DemonEvent>>,
    stop_on_quote: Option<Arc<ShutdownManager>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping(shutdown: Arc<ShutdownManager>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            stop_on_quote: Some(shutdown),
        }
    }

    pub fn events(&self) -> Vec<DemonEvent> {
        self.events.lock().clone()
    }

    pub fn quotes(&self) -> Vec<DemonEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, DemonEvent::QuoteSubmitted { .. }))
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DemonEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &DemonEvent) {
        self.events.lock().push(event.clone());
        if let (Some(shutdown), DemonEvent::QuoteSubmitted { .. }) = (&self.stop_on_quote, event) {
            shutdown.trigger();
        }
    }
}

pub struct Harness {
    pub exchange: Arc<MockExchange>,
    pub store: Arc<MemoryStore>,
    pub sink: Arc<RecordingSink>,
    pub shutdown: Arc<ShutdownManager>,
}

impl Harness {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            exchange: Arc::new(MockExchange::new()),
            store: Arc::new(store),
            sink: Arc::new(RecordingSink::new()),
            shutdown: Arc::new(ShutdownManager::new()),
        }
    }

    /// Sink triggers shutdown on the first quote it sees
    pub fn stopping_after_first_quote(store: MemoryStore) -> Self {
        let shutdown = Arc::new(ShutdownManager::new());
        Self {
            exchange: Arc::new(MockExchange::new()),
            store: Arc::new(store),
            sink: Arc::new(RecordingSink::stopping(Arc::clone(&shutdown))),
            shutdown,
        }
    }

    pub fn context(&self) -> StrategyContext {
        StrategyContext::new(
            self.exchange.clone(),
            self.store.clone(),
            self.sink.clone(),
            self.shutdown.clone(),
        )
    }
}

pub fn bot_trade(id: u64, is_buyer: bool, base_qty: f64, price: f64) -> Trade {
    Trade {
        id,
        order_id: 10_000 + id,
        client_order_id: format!("SHN-{}-BTCUSDT-{}", if is_buyer { "B" } else { "S" }, 1000 + id),
        is_buyer,
        price,
        base_qty,
        quote_qty: base_qty * price,
        time: Utc::now(),
    }
}

pub fn foreign_trade(id: u64, is_buyer: bool, base_qty: f64, price: f64) -> Trade {
    Trade {
        client_order_id: format!("web_{}", id),
        ..bot_trade(id, is_buyer, base_qty, price)
    }
}

/// Parse a config with zero delays around the given pairs block
pub fn config(mode: &str, extra: &str, pairs: &str) -> DemonConfig {
    let yaml = format!(
        "mode: {}\nsend_delay_secs: 0\ncancel_delay_secs: 0\n{}\npairs:\n{}",
        mode, extra, pairs
    );
    DemonConfig::from_yaml_str(&yaml).unwrap()
}

pub const BTC_PAIR: &str =
    "  - {symbol: BTCUSDT, buy_skew: 0.9, sell_skew: 1.1, initial_base_qty: 10, initial_quote_qty: 1000}\n";
