//! Trading strategies

pub mod rebalancer;
pub mod traits;

pub use rebalancer::RebalancerStrategy;
pub use traits::{Strategy, StrategyContext, StrategyError, StrategyResult};
