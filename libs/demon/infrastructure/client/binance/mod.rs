//! Binance spot REST client
//!
//! - `auth`: API credentials and HMAC-SHA256 request signing
//! - `types`: response bodies
//! - `helpers`: status checks and error mapping
//! - `rest`: the `ExchangeClient` implementation

pub mod auth;
pub mod helpers;
pub mod rest;
pub mod types;

pub use auth::BinanceCredentials;
pub use rest::BinanceClient;
