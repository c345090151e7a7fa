//! Application Layer
//!
//! Quoting, bookkeeping and the control loop built on the domain ports.

pub mod strategies;

pub use strategies::rebalancer::{
    quote, select_skews, CycleReport, Ledger, LedgerError, LoopPhase, QuoteError, QuoteProposal,
    RebalanceScheduler, ReconcileError, Reconciler, DRIFT_THRESHOLD, MAX_BID_SKEW, MIN_ASK_SKEW,
};
pub use strategies::{RebalancerStrategy, Strategy, StrategyContext, StrategyError, StrategyResult};
