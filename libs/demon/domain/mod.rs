//! Domain Layer
//!
//! Plain data and collaborator contracts. Depends on nothing else in the
//! crate.

pub mod models;
pub mod order_tag;
pub mod pair_metadata;
pub mod ports;

pub use models::{LimitOrder, MarketPrice, OpenOrder, PairState, Side, Trade};
pub use order_tag::{is_bot_order, OrderTagger, BOT_TAG_PREFIX};
pub use pair_metadata::PairMetadata;
pub use ports::{DemonEvent, EventSink, ExchangeClient, ExchangeError, StateStore, StoreError};
