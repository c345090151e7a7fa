//! Event sink that writes operator events to the log

use tracing::{info, warn};

use crate::domain::{DemonEvent, EventSink};

/// Forwards every `DemonEvent` to `tracing`
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogSink {
    fn notify(&self, event: &DemonEvent) {
        match event {
            DemonEvent::TradeApplied { symbol, trade } => {
                info!(
                    "[Event] New trade ({}): {} qty {} price {} id {}",
                    trade.side(),
                    symbol,
                    trade.base_qty,
                    trade.price,
                    trade.id
                );
            }
            DemonEvent::QuoteSubmitted {
                symbol,
                side,
                price,
                qty,
                mid_price,
                distance,
                client_tag,
                dry_run,
            } => {
                info!(
                    "[Event] {}{} {} {} @ {} (mid {}, {}) tag {}",
                    if *dry_run { "[DRY RUN] " } else { "" },
                    side,
                    symbol,
                    qty,
                    price,
                    mid_price,
                    distance,
                    client_tag
                );
            }
            DemonEvent::MarketHitWarning {
                symbol,
                mid_price,
                target_bid,
                target_ask,
            } => {
                warn!(
                    "[Event] {}: quotes would hit the market (mid {} targets {}/{}), not sending; check inventory",
                    symbol, mid_price, target_bid, target_ask
                );
            }
            DemonEvent::Error { symbol, message } => match symbol {
                Some(symbol) => warn!("[Event] {}: {}", symbol, message),
                None => warn!("[Event] {}", message),
            },
        }
    }
}
