//! Output module
//!
//! Encodes fetched klines and writes them to a local directory or a cloud
//! bucket.
//!
//! # Overview
//!
//! - CSV (default), Parquet and newline-delimited JSON encoders
//! - Destinations backed by `object_store` (local, S3, R2, GCS, Azure)
//! - [`KlineWriter`] ties the transform, an encoder and a destination together

mod destination;
mod sink;
mod writer;

pub use destination::Destination;
pub use sink::{default_file_name, KlineWriter, WriteReport};
pub use writer::{encode_batch, write_csv, write_json_lines, write_parquet, ParquetWriterConfig};

#[cfg(test)]
mod tests;
