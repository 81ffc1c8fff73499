//! Kline sources
//!
//! Concrete [`BatchFetch`](crate::engine::BatchFetch) implementations that
//! turn one batch request into one upstream HTTP call.

mod binance;

pub use binance::{BinanceKlineSource, BinanceSourceConfig, DEFAULT_BASE_URL, KLINES_PATH};

#[cfg(test)]
mod tests;
