//! Trade reconciliation
//!
//! Pulls fills reported by the exchange since the ledger cursor, folds the
//! bot's own fills into the ledger exactly once, and persists the result.

use thiserror::Error;
use tracing::{debug, info};

use super::ledger::{Ledger, LedgerError};
use crate::domain::{DemonEvent, EventSink, ExchangeClient, ExchangeError, StateStore, StoreError, Trade};

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to fetch trades: {0}")]
    Fetch(#[from] ExchangeError),

    #[error("Ledger rejected trades: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Failed to persist ledger: {0}")]
    Persist(#[from] StoreError),
}

pub struct Reconciler<'a> {
    exchange: &'a dyn ExchangeClient,
    store: &'a dyn StateStore,
    sink: &'a dyn EventSink,
}

impl<'a> Reconciler<'a> {
    pub fn new(exchange: &'a dyn ExchangeClient, store: &'a dyn StateStore, sink: &'a dyn EventSink) -> Self {
        Self { exchange, store, sink }
    }

    /// Apply every new bot fill for `symbol` and return them.
    ///
    /// On any error the ledger entry for `symbol` is left as it was before
    /// the call; the same fills are fetched again next cycle.
    pub async fn reconcile(&self, ledger: &mut Ledger, symbol: &str) -> Result<Vec<Trade>, ReconcileError> {
        let cursor = ledger
            .get(symbol)
            .ok_or_else(|| LedgerError::UnknownSymbol(symbol.to_string()))?
            .last_applied_trade_id;

        let trades = self.exchange.get_new_trades(symbol, cursor).await?;
        if trades.is_empty() {
            debug!("[Reconciler] {}: no new trades after id {}", symbol, cursor);
            return Ok(Vec::new());
        }

        let update = ledger.apply_trades(symbol, &trades)?;

        let changed = ledger.get(symbol).is_some_and(|p| update.changed(p));
        if changed {
            if let Err(e) = self.store.save_state(ledger.pairs()) {
                // Memory must not run ahead of durable state
                ledger.restore(update.previous)?;
                return Err(e.into());
            }
        }

        if update.skipped_foreign > 0 {
            debug!(
                "[Reconciler] {}: skipped {} fills from orders not placed by the bot",
                symbol, update.skipped_foreign
            );
        }

        for trade in &update.applied {
            self.sink.notify(&DemonEvent::TradeApplied {
                symbol: symbol.to_string(),
                trade: trade.clone(),
            });
        }

        if let Some(pair) = ledger.get(symbol).filter(|_| !update.applied.is_empty()) {
            info!(
                "[Reconciler] {}: base {} quote {} cursor {}",
                symbol, pair.base_qty, pair.quote_qty, pair.last_applied_trade_id
            );
        }

        Ok(update.applied)
    }
}
