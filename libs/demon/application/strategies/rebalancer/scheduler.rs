//! Rebalance scheduler
//!
//! Turns on special-order mode once per interval. The flag stays on for one
//! complete sweep over every symbol so all pairs in a cycle see the same mode.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RebalanceScheduler {
    /// `None` disables special orders
    interval: Option<Duration>,
    last_rebalance: Instant,
    special_orders: bool,
}

impl RebalanceScheduler {
    pub fn new(interval: Option<Duration>) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Option<Duration>, start: Instant) -> Self {
        Self {
            interval,
            last_rebalance: start,
            special_orders: false,
        }
    }

    /// Raise the flag if the interval has elapsed. Returns the mode for this sweep.
    pub fn check(&mut self, now: Instant) -> bool {
        if let Some(interval) = self.interval {
            if now.saturating_duration_since(self.last_rebalance) >= interval {
                self.special_orders = true;
                self.last_rebalance = now;
            }
        }
        self.special_orders
    }

    /// Consume the flag after a full sweep
    pub fn complete_sweep(&mut self) {
        self.special_orders = false;
    }

    pub fn special_orders(&self) -> bool {
        self.special_orders
    }
}
