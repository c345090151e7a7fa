//! Inventory ledger
//!
//! Owns every `PairState`. Fills are folded in transactionally: a batch is
//! applied to a copy of the pair and committed only when every fill in it
//! applied cleanly.

use thiserror::Error;

use crate::domain::{is_bot_order, PairMetadata, PairState, Trade};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid trade {id}: {reason}")]
    InvalidTrade { id: u64, reason: String },
}

/// Outcome of a committed batch
#[derive(Debug, Clone)]
pub struct LedgerUpdate {
    /// Bot fills folded into the balances, ascending by id
    pub applied: Vec<Trade>,
    /// Fills from orders this bot did not place; cursor moved past them
    pub skipped_foreign: usize,
    /// Pair as it was before the batch, for rollback
    pub previous: PairState,
}

impl LedgerUpdate {
    pub fn changed(&self, current: &PairState) -> bool {
        self.previous.last_applied_trade_id != current.last_applied_trade_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pairs: Vec<PairState>,
}

impl Ledger {
    pub fn new(pairs: Vec<PairState>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, symbol: &str) -> Option<&PairState> {
        self.pairs.iter().find(|p| p.symbol == symbol)
    }

    pub fn pairs(&self) -> &[PairState] {
        &self.pairs
    }

    pub fn symbols(&self) -> Vec<String> {
        self.pairs.iter().map(|p| p.symbol.clone()).collect()
    }

    pub fn set_metadata(&mut self, symbol: &str, metadata: PairMetadata) -> Result<(), LedgerError> {
        self.get_mut(symbol)?.metadata = metadata;
        Ok(())
    }

    /// Put a pair back to an earlier state
    pub fn restore(&mut self, previous: PairState) -> Result<(), LedgerError> {
        let slot = self.get_mut(&previous.symbol)?;
        *slot = previous;
        Ok(())
    }

    /// Fold a batch of fills into one pair.
    ///
    /// Fills are taken in ascending id order; anything at or below the
    /// cursor was already applied and is ignored. Fills from foreign orders
    /// advance the cursor without touching balances.
    pub fn apply_trades(&mut self, symbol: &str, trades: &[Trade]) -> Result<LedgerUpdate, LedgerError> {
        let current = self.get_mut(symbol)?;
        let previous = current.clone();
        let mut working = current.clone();

        let mut ordered: Vec<&Trade> = trades.iter().collect();
        ordered.sort_by_key(|t| t.id);

        let mut applied = Vec::new();
        let mut skipped_foreign = 0;

        for trade in ordered {
            if trade.id <= working.last_applied_trade_id {
                continue;
            }
            if !is_bot_order(&trade.client_order_id) {
                working.last_applied_trade_id = trade.id;
                skipped_foreign += 1;
                continue;
            }
            validate_trade(trade)?;
            working.apply_trade(trade);
            applied.push(trade.clone());
        }

        *current = working;

        Ok(LedgerUpdate {
            applied,
            skipped_foreign,
            previous,
        })
    }

    fn get_mut(&mut self, symbol: &str) -> Result<&mut PairState, LedgerError> {
        self.pairs
            .iter_mut()
            .find(|p| p.symbol == symbol)
            .ok_or_else(|| LedgerError::UnknownSymbol(symbol.to_string()))
    }
}

fn validate_trade(trade: &Trade) -> Result<(), LedgerError> {
    let quantities_ok = trade.base_qty.is_finite()
        && trade.quote_qty.is_finite()
        && trade.base_qty >= 0.0
        && trade.quote_qty >= 0.0;
    if !quantities_ok {
        return Err(LedgerError::InvalidTrade {
            id: trade.id,
            reason: format!("quantities base={} quote={}", trade.base_qty, trade.quote_qty),
        });
    }
    Ok(())
}
