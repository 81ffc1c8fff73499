//! Execution engine module
//!
//! Pagination loop that rebuilds a long kline series from bounded batches.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginationEngine` - Drives the fetch loop for one (symbol, interval) stream
//! - `BatchFetch` - The injected capability performing one upstream request
//! - `FetchObserver` - Progress events (batch start, batch size, termination)
//! - `FetchConfig` / `FetchStats` / `FetchOutcome` - Run configuration and results
//!
//! Each window starts one interval after the open time of the last record
//! received, so batch boundaries are neither duplicated nor skipped. A failed
//! or empty batch ends the run with whatever was accumulated; a batch shorter
//! than the request limit is the last one.

mod fetch;
mod types;

pub use fetch::{BatchFetch, FetchObserver, NoopObserver, RetryingFetch, TracingObserver};
pub use types::{
    BatchRequest, FetchConfig, FetchOutcome, FetchStats, FetchWindow, Termination,
    DEFAULT_BATCH_DELAY, DEFAULT_LIMIT,
};

use crate::error::Result;
use crate::interval::duration_millis;
use crate::types::{EpochMillis, Kline};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Sequential pagination engine
#[derive(Clone)]
pub struct PaginationEngine {
    /// Fetch configuration
    config: FetchConfig,
    /// Progress observer
    observer: Arc<dyn FetchObserver>,
}

impl PaginationEngine {
    /// Create a new engine with default configuration and tracing output
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Set fetch configuration
    #[must_use]
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the progress observer
    #[must_use]
    pub fn with_observer(mut self, observer: impl FetchObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Get the fetch configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch every kline in `[start_ms, end_ms)`.
    ///
    /// Returns an empty vector for an empty range without calling `fetcher`.
    /// The only error is a malformed interval token.
    pub async fn fetch_all(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: EpochMillis,
        end_ms: EpochMillis,
        fetcher: &dyn BatchFetch,
    ) -> Result<Vec<Kline>> {
        let outcome = self
            .run(symbol, interval, start_ms, end_ms, fetcher)
            .await?;
        Ok(outcome.records)
    }

    /// Same as [`fetch_all`](Self::fetch_all), also reporting why the run
    /// stopped and how many requests it took.
    pub async fn run(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: EpochMillis,
        end_ms: EpochMillis,
        fetcher: &dyn BatchFetch,
    ) -> Result<FetchOutcome> {
        let started = Instant::now();
        let mut stats = FetchStats::new();
        let mut window = FetchWindow::new(start_ms, end_ms);

        if !window.is_open() {
            return Ok(self.finish(Vec::new(), Termination::EmptyRange, stats, started));
        }

        // Resolved before the first request: a malformed token aborts the run.
        let step_ms = duration_millis(interval)?;
        let limit = self.config.limit as usize;
        let mut records: Vec<Kline> = Vec::new();

        let termination = loop {
            if !window.is_open() {
                break Termination::RangeCovered;
            }

            let request = BatchRequest::new(symbol, interval, window, self.config.limit);
            self.observer.on_batch_start(&request);

            let batch = match fetcher.fetch_batch(&request).await {
                Ok(batch) => batch,
                Err(e) => {
                    stats.add_failure();
                    self.observer.on_batch_failed(&request, &e);
                    break Termination::Failed;
                }
            };

            let batch_len = batch.len();
            stats.add_batch(batch_len);
            self.observer.on_batch(&request, batch_len);

            let Some(last_open_time) = batch.last().map(Kline::open_time) else {
                break Termination::EmptyBatch;
            };
            records.extend(batch);

            let next = window.advance_past(last_open_time, step_ms);
            if next.start <= window.start {
                warn!(
                    symbol,
                    from_ms = window.start,
                    last_open_time,
                    "Upstream returned records before the requested window, stopping"
                );
                break Termination::Stalled;
            }
            window = next;

            if batch_len < limit {
                break Termination::UnderFilled;
            }

            if window.is_open() && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        };

        Ok(self.finish(records, termination, stats, started))
    }

    fn finish(
        &self,
        records: Vec<Kline>,
        termination: Termination,
        mut stats: FetchStats,
        started: Instant,
    ) -> FetchOutcome {
        stats.set_duration(started.elapsed().as_millis() as u64);
        let outcome = FetchOutcome {
            records,
            termination,
            stats,
        };
        self.observer.on_finish(&outcome);
        outcome
    }
}

impl Default for PaginationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PaginationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
