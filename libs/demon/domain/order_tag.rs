//! Client order tags
//!
//! Every order this bot places carries a client id starting with
//! [`BOT_TAG_PREFIX`]. Ownership of open orders and fills is decided only by
//! [`is_bot_order`].

use chrono::{DateTime, Utc};

use super::models::Side;

/// Reserved client-order-id prefix for bot orders
pub const BOT_TAG_PREFIX: &str = "SHN";

/// Fixed epoch (seconds) that tag stamps are measured from
pub const TAG_EPOCH_SECS: i64 = 1_579_349_682;

/// Longest client order id the exchange accepts
pub const MAX_TAG_LEN: usize = 36;

/// Longest symbol that still yields a valid tag
pub const MAX_SYMBOL_LEN: usize = 16;

/// Whether a client order id was issued by this bot
pub fn is_bot_order(client_order_id: &str) -> bool {
    client_order_id
        .strip_prefix(BOT_TAG_PREFIX)
        .is_some_and(|rest| rest.starts_with('-'))
}

/// Generates unique client tags of the form `SHN-{B|S}-{symbol}-{stamp}`.
///
/// `stamp` is milliseconds since [`TAG_EPOCH_SECS`], forced strictly
/// increasing per tagger so two tags generated within the same millisecond
/// never collide.
#[derive(Debug, Default)]
pub struct OrderTagger {
    last_stamp: i64,
}

impl OrderTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag for an order generated now
    pub fn next_tag(&mut self, side: Side, symbol: &str) -> String {
        self.next_tag_at(side, symbol, Utc::now())
    }

    /// Tag for an order generated at `now`
    pub fn next_tag_at(&mut self, side: Side, symbol: &str, now: DateTime<Utc>) -> String {
        let elapsed_ms = now.timestamp_millis() - TAG_EPOCH_SECS * 1000;
        let stamp = elapsed_ms.max(self.last_stamp + 1);
        self.last_stamp = stamp;
        format!("{}-{}-{}-{}", BOT_TAG_PREFIX, side.code(), symbol, stamp)
    }
}
