//! Infrastructure Layer
//!
//! Implementations of the domain ports (Binance, JSON file, log sink) plus
//! configuration, logging and shutdown handling.

pub mod client;
pub mod config;
pub mod logging;
pub mod persistence;
pub mod shutdown;
pub mod sink;

pub use client::{BinanceClient, BinanceCredentials};
pub use config::{ConfigError, DemonConfig, ExchangeConfig, PairConfig, TradingMode};
pub use logging::init_tracing_with_level;
pub use persistence::JsonStateStore;
pub use shutdown::ShutdownManager;
pub use sink::LogSink;
