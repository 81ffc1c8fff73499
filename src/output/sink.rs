//! Kline sink: transform, encode, put

use super::destination::Destination;
use super::writer::{encode_batch, ParquetWriterConfig};
use crate::error::Result;
use crate::transform::{klines_to_batch, TransformConfig};
use crate::types::{Kline, OutputFormat};
use serde::Serialize;
use tracing::info;

/// Default file name for a symbol/interval pair
///
/// `binance_{symbol_lowercase}_{interval}_data.{ext}`
pub fn default_file_name(symbol: &str, interval: &str, format: OutputFormat) -> String {
    format!(
        "binance_{}_{}_data.{}",
        symbol.to_lowercase(),
        interval,
        format.extension()
    )
}

/// What a write produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Full location of the written object
    pub location: String,
    /// Rows written
    pub rows: usize,
    /// Encoded size in bytes
    pub bytes: usize,
    /// Format used
    pub format: OutputFormat,
}

/// Writes klines to a destination in one format
#[derive(Debug, Clone)]
pub struct KlineWriter {
    destination: Destination,
    format: OutputFormat,
    transform: TransformConfig,
    parquet: ParquetWriterConfig,
}

impl KlineWriter {
    pub fn new(destination: Destination, format: OutputFormat) -> Self {
        Self {
            destination,
            format,
            transform: TransformConfig::default(),
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Override the selected columns
    #[must_use]
    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    /// Override Parquet writer settings
    #[must_use]
    pub fn with_parquet(mut self, parquet: ParquetWriterConfig) -> Self {
        self.parquet = parquet;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encode klines in memory and put them under `file_name`.
    ///
    /// The input slice is only borrowed, so a failed write leaves the
    /// caller's records intact for another attempt.
    pub async fn write_klines(&self, file_name: &str, klines: &[Kline]) -> Result<WriteReport> {
        let batch = klines_to_batch(klines, &self.transform)?;
        let data = encode_batch(&batch, self.format, &self.parquet)?;
        let bytes = data.len();

        let location = self.destination.write(file_name, data).await?;
        info!(
            "Wrote {} klines ({} bytes) to {}",
            batch.num_rows(),
            bytes,
            location
        );

        Ok(WriteReport {
            location,
            rows: batch.num_rows(),
            bytes,
            format: self.format,
        })
    }
}
