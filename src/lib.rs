// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # kline-backfill
//!
//! Rebuilds a long, gap-free candlestick (kline) series from an exchange API
//! that caps every response at a fixed number of records.
//!
//! ## Features
//!
//! - **Interval Clock**: Maps `"15m"`, `"4h"`, `"1d"` to a step in milliseconds
//! - **Pagination Engine**: Walks `[start, end)` in bounded batches without
//!   duplicating or skipping boundary records
//! - **HTTP Transport**: Retries, backoff and client-side rate limiting
//! - **Arrow Output**: Typed RecordBatch written as CSV, Parquet or JSON lines,
//!   locally or to S3/R2/GCS/Azure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kline_backfill::engine::PaginationEngine;
//! use kline_backfill::http::{HttpClient, HttpClientConfig};
//! use kline_backfill::source::{BinanceKlineSource, DEFAULT_BASE_URL};
//!
//! #[tokio::main]
//! async fn main() -> kline_backfill::Result<()> {
//!     let client = HttpClient::with_config(
//!         HttpClientConfig::builder().base_url(DEFAULT_BASE_URL).build(),
//!     )?;
//!     let source = BinanceKlineSource::new(client);
//!
//!     let klines = PaginationEngine::new()
//!         .fetch_all("BTCUSDT", "1h", 1_704_067_200_000, 1_735_689_600_000, &source)
//!         .await?;
//!     println!("{} klines", klines.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         CLI / Runner                          │
//! │   config + job → engine.run() → klines_to_batch() → write     │
//! └───────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────┬───┴─────────┬───────────┬──────────┐
//! │ Interval  │   Engine     │   Source    │ Transform │  Output  │
//! ├───────────┼──────────────┼─────────────┼───────────┼──────────┤
//! │ m / h / d │ Windows      │ /klines     │ Columns   │ CSV      │
//! │ Fallback  │ Termination  │ HTTP retry  │ Timestamps│ Parquet  │
//! │           │ Observer     │ Rate limit  │ Float64   │ S3 / GCS │
//! └───────────┴──────────────┴─────────────┴───────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Interval token to step duration
pub mod interval;

/// Pagination engine
pub mod engine;

/// HTTP client with retry and rate limiting
pub mod http;

/// Upstream kline sources
pub mod source;

/// Kline to Arrow conversion
pub mod transform;

/// CSV/Parquet/JSON output and destinations
pub mod output;

/// Backfill configuration and fetch jobs
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{BackfillConfig, FetchJob};
pub use engine::{BatchFetch, PaginationEngine};
pub use interval::duration_millis;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
