//! Batch fetch capability and observers
//!
//! The engine never talks to the network directly. It is handed a
//! [`BatchFetch`] and reports progress to a [`FetchObserver`].

use super::types::{BatchRequest, FetchOutcome};
use crate::error::{Error, Result};
use crate::types::Kline;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// BatchFetch
// ============================================================================

/// Performs one bounded request against the upstream.
///
/// Implementations return ordinary network and API problems as `Err`.
/// The engine reads any `Err` (and an empty batch) as "no more data".
#[async_trait]
pub trait BatchFetch: Send + Sync {
    /// Fetch one batch of klines for the request window
    async fn fetch_batch(&self, request: &BatchRequest) -> Result<Vec<Kline>>;
}

#[async_trait]
impl<T: BatchFetch + ?Sized> BatchFetch for Box<T> {
    async fn fetch_batch(&self, request: &BatchRequest) -> Result<Vec<Kline>> {
        (**self).fetch_batch(request).await
    }
}

// ============================================================================
// RetryingFetch
// ============================================================================

/// Retries retryable batch failures before handing them to the engine.
///
/// Empty batches are passed through untouched.
#[derive(Debug)]
pub struct RetryingFetch<F> {
    inner: F,
    max_retries: u32,
    pause: Duration,
}

impl<F: BatchFetch> RetryingFetch<F> {
    /// Wrap a fetcher
    pub fn new(inner: F, max_retries: u32, pause: Duration) -> Self {
        Self {
            inner,
            max_retries,
            pause,
        }
    }

    /// Get the wrapped fetcher
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: BatchFetch> BatchFetch for RetryingFetch<F> {
    async fn fetch_batch(&self, request: &BatchRequest) -> Result<Vec<Kline>> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_batch(request).await {
                Ok(batch) => return Ok(batch),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        symbol = %request.symbol,
                        from_ms = request.from_ms,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Batch failed, retrying in {:?}",
                        self.pause
                    );
                    if !self.pause.is_zero() {
                        tokio::time::sleep(self.pause).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ============================================================================
// FetchObserver
// ============================================================================

/// Receives progress events from the engine
pub trait FetchObserver: Send + Sync {
    /// A request is about to be sent
    fn on_batch_start(&self, _request: &BatchRequest) {}

    /// A request returned `count` records
    fn on_batch(&self, _request: &BatchRequest, _count: usize) {}

    /// A request failed
    fn on_batch_failed(&self, _request: &BatchRequest, _error: &Error) {}

    /// The run finished
    fn on_finish(&self, _outcome: &FetchOutcome) {}
}

/// Observer that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FetchObserver for NoopObserver {}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_batch_start(&self, request: &BatchRequest) {
        debug!(
            symbol = %request.symbol,
            interval = %request.interval,
            from_ms = request.from_ms,
            to_ms = request.to_ms,
            limit = request.limit,
            "Fetching batch"
        );
    }

    fn on_batch(&self, request: &BatchRequest, count: usize) {
        info!(
            symbol = %request.symbol,
            from_ms = request.from_ms,
            count,
            "Batch received"
        );
    }

    fn on_batch_failed(&self, request: &BatchRequest, error: &Error) {
        warn!(
            symbol = %request.symbol,
            from_ms = request.from_ms,
            error = %error,
            "Batch failed, treating as end of data"
        );
    }

    fn on_finish(&self, outcome: &FetchOutcome) {
        info!(
            termination = %outcome.termination,
            records = outcome.stats.records_fetched,
            batches = outcome.stats.batches_fetched,
            failed = outcome.stats.failed_batches,
            duration_ms = outcome.stats.duration_ms,
            "Fetch finished"
        );
    }
}
