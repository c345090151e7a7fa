//! Strategy trait definition
//!
//! Defines the contract a trading strategy implements and the context the
//! runner hands to it.

use crate::application::strategies::rebalancer::LedgerError;
use crate::domain::{EventSink, ExchangeClient, ExchangeError, StateStore, StoreError};
use crate::infrastructure::shutdown::ShutdownManager;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for strategy operations
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Errors that stop a strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quotes would hit the market on startup for {0}; inspect configured quantities")]
    MarketHitOnStartup(String),
}

/// Context provided to strategies
#[derive(Clone)]
pub struct StrategyContext {
    /// Exchange connectivity
    pub exchange: Arc<dyn ExchangeClient>,
    /// Durable ledger storage
    pub store: Arc<dyn StateStore>,
    /// Operator-facing event sink
    pub sink: Arc<dyn EventSink>,
    /// Shutdown manager for interruptible operations
    pub shutdown: Arc<ShutdownManager>,
}

impl StrategyContext {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        store: Arc<dyn StateStore>,
        sink: Arc<dyn EventSink>,
        shutdown: Arc<ShutdownManager>,
    ) -> Self {
        Self {
            exchange,
            store,
            sink,
            shutdown,
        }
    }

    /// Check if the strategy should continue running
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }
}

/// Trait that strategies implement
#[async_trait]
pub trait Strategy: Send {
    /// Get the strategy name for logging and identification
    fn name(&self) -> &str;

    /// Get a description of what this strategy does
    fn description(&self) -> &str;

    /// Called once before `start()`. Errors here are fatal.
    async fn initialize(&mut self, _ctx: &StrategyContext) -> StrategyResult<()> {
        Ok(())
    }

    /// Run the main loop until shutdown or an unrecoverable error.
    ///
    /// Implementations check `ctx.is_running()` between steps and use
    /// `ctx.shutdown.interruptible_sleep()` for delays.
    async fn start(&mut self, ctx: &StrategyContext) -> StrategyResult<()>;

    /// Clean up after `start()` returns
    async fn stop(&mut self, _ctx: &StrategyContext) -> StrategyResult<()> {
        Ok(())
    }
}
