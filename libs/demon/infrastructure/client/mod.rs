//! Exchange clients

pub mod binance;

pub use binance::{BinanceClient, BinanceCredentials};
