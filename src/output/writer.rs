//! In-memory encoders for the supported output formats
//!
//! Every format is encoded into a byte buffer first, so the same bytes can be
//! put into a local directory or a cloud bucket.

use crate::error::{Error, Result};
use crate::types::{OutputFormat, ParquetCompression};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;

/// Configuration for Parquet output
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    statistics_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Apply a configured compression
    #[must_use]
    pub fn with_compression(self, compression: ParquetCompression) -> Self {
        match compression {
            ParquetCompression::Snappy => Self {
                compression: Compression::SNAPPY,
                ..self
            },
            ParquetCompression::Zstd => self.zstd(),
            ParquetCompression::Uncompressed => self.uncompressed(),
        }
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Get compression codec
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Encode a batch as Parquet into any writer
pub fn write_parquet<W: Write + Send>(
    sink: W,
    batch: &RecordBatch,
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let mut writer = ArrowWriter::try_new(sink, batch.schema(), Some(config.build_properties()))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(batch.num_rows())
}

/// Encode a batch as CSV with a header row and RFC 3339 timestamps
pub fn write_csv<W: Write>(sink: W, batch: &RecordBatch) -> Result<usize> {
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(sink);
    writer
        .write(batch)
        .map_err(|e| Error::output(format!("Failed to write CSV: {e}")))?;
    Ok(batch.num_rows())
}

/// Encode a batch as newline-delimited JSON
pub fn write_json_lines<W: Write>(sink: W, batch: &RecordBatch) -> Result<usize> {
    let mut writer = arrow::json::LineDelimitedWriter::new(sink);
    writer
        .write(batch)
        .map_err(|e| Error::output(format!("Failed to write JSON: {e}")))?;
    writer
        .finish()
        .map_err(|e| Error::output(format!("Failed to finish JSON: {e}")))?;
    Ok(batch.num_rows())
}

/// Encode a batch in the requested format
pub fn encode_batch(
    batch: &RecordBatch,
    format: OutputFormat,
    parquet: &ParquetWriterConfig,
) -> Result<Bytes> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Csv => write_csv(&mut buf, batch)?,
        OutputFormat::Parquet => write_parquet(&mut buf, batch, parquet)?,
        OutputFormat::Json => write_json_lines(&mut buf, batch)?,
    };
    Ok(Bytes::from(buf))
}
