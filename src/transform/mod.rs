//! Transform module
//!
//! Turns raw kline tuples into a typed Arrow RecordBatch.
//!
//! # Overview
//!
//! - Selects a subset of the upstream columns (OpenTime..CloseTime by default)
//! - Converts open/close times from epoch milliseconds to UTC timestamps
//! - Coerces numeric strings to `Float64` / `Int64`

mod columns;
mod convert;

pub use columns::{KlineColumn, DEFAULT_COLUMNS};
pub use convert::{kline_schema, klines_to_batch, TransformConfig};

#[cfg(test)]
mod tests;
