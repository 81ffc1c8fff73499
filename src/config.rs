//! Backfill configuration
//!
//! A [`BackfillConfig`] describes where klines come from, how the engine pages
//! through them and where the result goes. It is loaded from YAML or JSON and
//! every field has a default, so an empty file is a valid config.
//!
//! A [`FetchJob`] is the symbol, interval and time range of a single run.

use crate::engine::{FetchConfig, DEFAULT_LIMIT};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::output::{default_file_name, ParquetWriterConfig};
use crate::source::{BinanceSourceConfig, DEFAULT_BASE_URL, KLINES_PATH};
use crate::transform::{KlineColumn, TransformConfig};
use crate::types::{BackoffType, EpochMillis, OutputFormat, ParquetCompression};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Symbol fetched when none is given
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

/// Interval fetched when none is given
pub const DEFAULT_INTERVAL: &str = "1h";

/// Length of the default trailing range
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete backfill configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// Upstream API settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Pagination loop settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Sink settings
    #[serde(default)]
    pub output: OutputConfig,
}

// ============================================================================
// Source Config
// ============================================================================

/// Upstream API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Exchange REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Kline endpoint path
    #[serde(default = "default_klines_path")]
    pub klines_path: String,

    /// Records requested per batch
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Transport-level retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Client-side rate limit, `null` to disable
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            klines_path: default_klines_path(),
            limit: default_limit(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_klines_path() -> String {
    KLINES_PATH.to_string()
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60_000
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Pagination loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Pause between batches in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Extra attempts for a failed batch before the run stops, 0 to stop at once
    #[serde(default)]
    pub retry_failed_batches: u32,

    /// Pause before retrying a failed batch in milliseconds
    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: default_batch_delay_ms(),
            retry_failed_batches: 0,
            retry_pause_ms: default_retry_pause_ms(),
        }
    }
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_retry_pause_ms() -> u64 {
    1_000
}

// ============================================================================
// Output Config
// ============================================================================

/// Sink settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Local directory or cloud URL (`s3://`, `r2://`, `gs://`, `az://`)
    #[serde(default = "default_destination")]
    pub destination: String,

    /// File format
    #[serde(default)]
    pub format: OutputFormat,

    /// File name, derived from symbol and interval when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Columns to keep, OpenTime through CloseTime when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<KlineColumn>>,

    /// Parquet writer settings, used when `format` is `parquet`
    #[serde(default)]
    pub parquet: ParquetSettings,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            format: OutputFormat::default(),
            file_name: None,
            columns: None,
            parquet: ParquetSettings::default(),
        }
    }
}

fn default_destination() -> String {
    ".".to_string()
}

/// Parquet writer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetSettings {
    /// Column compression
    #[serde(default)]
    pub compression: ParquetCompression,

    /// Maximum rows per row group
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    /// Write column statistics
    #[serde(default = "default_true")]
    pub statistics: bool,
}

impl Default for ParquetSettings {
    fn default() -> Self {
        Self {
            compression: ParquetCompression::default(),
            row_group_size: default_row_group_size(),
            statistics: true,
        }
    }
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Loading & Conversion
// ============================================================================

impl BackfillConfig {
    /// Load a config file. `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse YAML. Blank input yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.source.limit == 0 {
            return Err(Error::invalid_value("source.limit", "must be at least 1"));
        }
        url::Url::parse(&self.source.base_url)
            .map_err(|e| Error::invalid_value("source.base_url", e.to_string()))?;
        if !self.source.klines_path.starts_with('/') {
            return Err(Error::invalid_value("source.klines_path", "must start with '/'"));
        }
        if self.source.timeout_secs == 0 {
            return Err(Error::invalid_value("source.timeout_secs", "must be at least 1"));
        }
        if self.output.destination.trim().is_empty() {
            return Err(Error::invalid_value("output.destination", "must not be empty"));
        }
        if self.output.parquet.row_group_size == 0 {
            return Err(Error::invalid_value(
                "output.parquet.row_group_size",
                "must be at least 1",
            ));
        }
        if let Some(columns) = &self.output.columns {
            if columns.is_empty() {
                return Err(Error::invalid_value(
                    "output.columns",
                    "must name at least one column",
                ));
            }
        }
        Ok(())
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// HTTP client settings for the source
    pub fn http_client_config(&self) -> HttpClientConfig {
        let source = &self.source;
        let builder = HttpClientConfig::builder()
            .base_url(source.base_url.as_str())
            .timeout(Duration::from_secs(source.timeout_secs))
            .max_retries(source.max_retries)
            .backoff(
                source.backoff.backoff_type,
                Duration::from_millis(source.backoff.initial_ms),
                Duration::from_millis(source.backoff.max_ms),
            );

        let builder = match &source.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit.clone()),
            None => builder.no_rate_limit(),
        };
        builder.build()
    }

    /// Source endpoint settings
    pub fn source_config(&self) -> BinanceSourceConfig {
        BinanceSourceConfig {
            klines_path: self.source.klines_path.clone(),
        }
    }

    /// Engine settings
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new()
            .with_limit(self.source.limit)
            .with_batch_delay(Duration::from_millis(self.pagination.batch_delay_ms))
    }

    /// Pause between retries of a failed batch
    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.pagination.retry_pause_ms)
    }

    /// Column selection
    pub fn transform_config(&self) -> TransformConfig {
        match &self.output.columns {
            Some(columns) => TransformConfig {
                columns: columns.clone(),
            },
            None => TransformConfig::default(),
        }
    }

    /// Parquet writer settings
    pub fn parquet_writer_config(&self) -> ParquetWriterConfig {
        let parquet = &self.output.parquet;
        ParquetWriterConfig::new()
            .with_compression(parquet.compression)
            .with_row_group_size(parquet.row_group_size)
            .with_statistics(parquet.statistics)
    }

    /// File name for a job, the configured one or the default pattern
    pub fn file_name(&self, job: &FetchJob) -> String {
        self.output
            .file_name
            .clone()
            .unwrap_or_else(|| default_file_name(&job.symbol, &job.interval, self.output.format))
    }
}

// ============================================================================
// Fetch Job
// ============================================================================

/// Symbol, interval and half-open time range of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchJob {
    pub symbol: String,
    pub interval: String,
    pub start_ms: EpochMillis,
    pub end_ms: EpochMillis,
}

impl FetchJob {
    pub fn new(
        symbol: impl Into<String>,
        interval: impl Into<String>,
        start_ms: EpochMillis,
        end_ms: EpochMillis,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            start_ms,
            end_ms,
        }
    }

    /// Build a job from optional user input.
    ///
    /// Missing symbol and interval fall back to `BTCUSDT` / `1h`. A missing
    /// end means `now`, a missing start means 365 days before the end.
    pub fn resolve(
        symbol: Option<&str>,
        interval: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let symbol = symbol.unwrap_or(DEFAULT_SYMBOL).trim();
        if symbol.is_empty() {
            return Err(Error::invalid_value("symbol", "must not be empty"));
        }
        let interval = interval.unwrap_or(DEFAULT_INTERVAL).trim();

        let end_ms = match end {
            Some(value) => parse_timestamp(value)?,
            None => now.timestamp_millis(),
        };
        let start_ms = match start {
            Some(value) => parse_timestamp(value)?,
            None => end_ms - ChronoDuration::days(DEFAULT_LOOKBACK_DAYS).num_milliseconds(),
        };

        Ok(Self::new(symbol.to_uppercase(), interval, start_ms, end_ms))
    }

    /// Trailing year of a symbol/interval ending at `now`
    pub fn trailing_year(symbol: &str, interval: &str, now: DateTime<Utc>) -> Self {
        let end_ms = now.timestamp_millis();
        let start_ms = end_ms - ChronoDuration::days(DEFAULT_LOOKBACK_DAYS).num_milliseconds();
        Self::new(symbol, interval, start_ms, end_ms)
    }
}

/// Parse a timestamp given as epoch milliseconds, `YYYY-MM-DD` (midnight UTC)
/// or RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<EpochMillis> {
    let value = value.trim();

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<EpochMillis>()
            .map_err(|e| Error::invalid_value("timestamp", format!("'{value}': {e}")));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp_millis());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| {
            Error::invalid_value(
                "timestamp",
                format!("'{value}' is not epoch milliseconds, YYYY-MM-DD or RFC 3339"),
            )
        })
}
