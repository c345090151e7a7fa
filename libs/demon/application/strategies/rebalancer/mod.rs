//! Inventory rebalancing strategy
//!
//! - `quoter`: pure quote computation
//! - `ledger`: per-pair balances and trade cursor
//! - `reconciler`: folds exchange fills into the ledger and persists it
//! - `scheduler`: periodic special-order mode
//! - `strategy`: the control loop

pub mod ledger;
pub mod quoter;
pub mod reconciler;
pub mod scheduler;
pub mod strategy;

pub use ledger::{Ledger, LedgerError, LedgerUpdate};
pub use quoter::{quote, select_skews, QuoteError, QuoteProposal, DRIFT_THRESHOLD, MAX_BID_SKEW, MIN_ASK_SKEW};
pub use reconciler::{ReconcileError, Reconciler};
pub use scheduler::RebalanceScheduler;
pub use strategy::{CycleReport, LoopPhase, RebalancerStrategy};
