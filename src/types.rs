//! Common types used throughout kline-backfill
//!
//! This module contains the record type shared by the engine, the transport
//! and the transform, plus small enums used by configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Epoch milliseconds
pub type EpochMillis = i64;

// ============================================================================
// Kline Record
// ============================================================================

/// One candlestick as returned by the upstream API.
///
/// The raw tuple is kept verbatim; only the open time (element 0) is
/// interpreted here. Typing the remaining fields is the transform's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<JsonValue>", into = "Vec<JsonValue>")]
pub struct Kline {
    open_time: EpochMillis,
    values: Vec<JsonValue>,
}

impl Kline {
    /// Build a kline from a raw upstream tuple
    pub fn from_values(values: Vec<JsonValue>) -> Result<Self> {
        let open_time = values
            .first()
            .and_then(open_time_of)
            .ok_or_else(|| {
                Error::decode(format!(
                    "kline row must start with an integer open time, got {}",
                    values
                        .first()
                        .map_or_else(|| "an empty row".to_string(), ToString::to_string)
                ))
            })?;

        Ok(Self { open_time, values })
    }

    /// Open time in epoch milliseconds
    pub fn open_time(&self) -> EpochMillis {
        self.open_time
    }

    /// All raw values, open time included
    pub fn values(&self) -> &[JsonValue] {
        &self.values
    }

    /// Raw value at a tuple position
    pub fn get(&self, index: usize) -> Option<&JsonValue> {
        self.values.get(index)
    }

    /// Number of fields in the raw tuple
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Consume the kline, returning the raw tuple
    pub fn into_values(self) -> Vec<JsonValue> {
        self.values
    }
}

impl TryFrom<Vec<JsonValue>> for Kline {
    type Error = Error;

    fn try_from(values: Vec<JsonValue>) -> Result<Self> {
        Self::from_values(values)
    }
}

impl From<Kline> for Vec<JsonValue> {
    fn from(kline: Kline) -> Self {
        kline.values
    }
}

/// Open times arrive as JSON integers; some mirrors send them as strings.
fn open_time_of(value: &JsonValue) -> Option<EpochMillis> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Output Format
// ============================================================================

/// File format written by the sink
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Apache Parquet
    Parquet,
    /// Newline-delimited JSON
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Json => "json",
        }
    }
}

/// Parquet column compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParquetCompression {
    /// Snappy
    #[default]
    Snappy,
    /// ZSTD at the default level
    Zstd,
    /// No compression
    Uncompressed,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
