//! Shannon's Demon
//!
//! Inventory-rebalancing market maker for a single exchange account.
//!
//! ## Layers
//!
//! - **domain**: pair state, trades, rounding rules, order tags and the
//!   collaborator ports (exchange, persistence, notifications)
//! - **application**: quote engine, inventory ledger, trade reconciliation,
//!   rebalance scheduler and the control loop
//! - **infrastructure**: configuration, logging, shutdown, JSON state store
//!   and the Binance REST client

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    quote, CycleReport, Ledger, LoopPhase, QuoteError, QuoteProposal, RebalanceScheduler,
    RebalancerStrategy, Reconciler, Strategy, StrategyContext, StrategyError,
};
pub use domain::{
    is_bot_order, DemonEvent, EventSink, ExchangeClient, ExchangeError, LimitOrder, MarketPrice,
    OpenOrder, OrderTagger, PairMetadata, PairState, Side, StateStore, StoreError, Trade,
};
pub use infrastructure::{
    init_tracing_with_level, BinanceClient, BinanceCredentials, ConfigError, DemonConfig,
    JsonStateStore, LogSink, ShutdownManager, TradingMode,
};
