//! Engine types
//!
//! Fetch windows, batch requests, configuration and run statistics.

use crate::types::{EpochMillis, Kline};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Upstream page cap used when none is configured
pub const DEFAULT_LIMIT: u32 = 1000;

/// Pause between consecutive batch requests used when none is configured
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

// ============================================================================
// Fetch Window
// ============================================================================

/// Bounds of the next batch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Inclusive start, advances after every batch
    pub start: EpochMillis,
    /// Requested period end, fixed for the whole run
    pub end: EpochMillis,
}

impl FetchWindow {
    /// Create a window
    pub fn new(start: EpochMillis, end: EpochMillis) -> Self {
        Self { start, end }
    }

    /// True while there is still range left to fetch
    pub fn is_open(&self) -> bool {
        self.start < self.end
    }

    /// Window that starts one step after the last confirmed open time
    #[must_use]
    pub fn advance_past(self, last_open_time: EpochMillis, step_ms: i64) -> Self {
        Self {
            start: last_open_time.saturating_add(step_ms),
            end: self.end,
        }
    }
}

// ============================================================================
// Batch Request
// ============================================================================

/// One bounded request handed to a [`BatchFetch`](super::BatchFetch)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Interval token as given by the caller (e.g., "1h")
    pub interval: String,
    /// Window start in epoch milliseconds
    pub from_ms: EpochMillis,
    /// Window end in epoch milliseconds
    pub to_ms: EpochMillis,
    /// Maximum number of records the upstream should return
    pub limit: u32,
}

impl BatchRequest {
    /// Create a request for a window
    pub fn new(
        symbol: impl Into<String>,
        interval: impl Into<String>,
        window: FetchWindow,
        limit: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            from_ms: window.start,
            to_ms: window.end,
            limit,
        }
    }
}

// ============================================================================
// Fetch Config
// ============================================================================

/// Configuration for a pagination run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Records requested per batch; a shorter batch ends the run
    pub limit: u32,
    /// Pause between consecutive requests
    pub batch_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl FetchConfig {
    /// Create a new fetch config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request record limit
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the pause between requests
    #[must_use]
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }
}

// ============================================================================
// Termination
// ============================================================================

/// Why a pagination run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// `start >= end`, nothing was requested
    EmptyRange,
    /// The window advanced past the requested end
    RangeCovered,
    /// A batch came back shorter than the limit
    UnderFilled,
    /// A batch came back empty
    EmptyBatch,
    /// The fetcher reported a failure
    Failed,
    /// The upstream returned records that would not move the window forward
    Stalled,
}

impl Termination {
    /// Short machine-friendly name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyRange => "empty_range",
            Self::RangeCovered => "range_covered",
            Self::UnderFilled => "under_filled",
            Self::EmptyBatch => "empty_batch",
            Self::Failed => "failed",
            Self::Stalled => "stalled",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Stats & Outcome
// ============================================================================

/// Statistics from a pagination run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Requests that returned a batch (empty ones included)
    pub batches_fetched: usize,
    /// Records accumulated
    pub records_fetched: usize,
    /// Requests that failed
    pub failed_batches: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl FetchStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful batch
    pub fn add_batch(&mut self, records: usize) {
        self.batches_fetched += 1;
        self.records_fetched += records;
    }

    /// Record a failed request
    pub fn add_failure(&mut self) {
        self.failed_batches += 1;
    }

    /// Total requests issued
    pub fn requests(&self) -> usize {
        self.batches_fetched + self.failed_batches
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Everything a pagination run produced
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Accumulated records in fetch order
    pub records: Vec<Kline>,
    /// Why the run stopped
    pub termination: Termination,
    /// Run statistics
    pub stats: FetchStats,
}

impl FetchOutcome {
    /// Open time of the first record
    pub fn first_open_time(&self) -> Option<EpochMillis> {
        self.records.first().map(Kline::open_time)
    }

    /// Open time of the last record
    pub fn last_open_time(&self) -> Option<EpochMillis> {
        self.records.last().map(Kline::open_time)
    }

    /// True when the run ended because the upstream failed
    pub fn is_partial(&self) -> bool {
        matches!(self.termination, Termination::Failed | Termination::Stalled)
    }
}
