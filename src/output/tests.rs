//! Tests for output module

use super::*;
use crate::error::Error;
use crate::transform::{klines_to_batch, TransformConfig};
use crate::types::{Kline, OutputFormat, ParquetCompression};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

const T0: i64 = 1_704_067_200_000;

fn kline(open_time: i64, close: &str) -> Kline {
    Kline::from_values(vec![
        json!(open_time),
        json!("42283.58"),
        json!("42554.57"),
        json!("42261.02"),
        json!(close),
        json!("1271.681"),
        json!(open_time + 3_599_999),
        json!("53957248.97"),
        json!(47134),
        json!("682.575"),
        json!("28957416.81"),
        json!("0"),
    ])
    .unwrap()
}

fn sample() -> Vec<Kline> {
    vec![
        kline(T0, "42475.23"),
        kline(T0 + 3_600_000, "42500.1"),
        kline(T0 + 7_200_000, "42390"),
    ]
}

// ============================================================================
// File Name Tests
// ============================================================================

#[test]
fn test_default_file_name() {
    assert_eq!(
        default_file_name("BTCUSDT", "1h", OutputFormat::Csv),
        "binance_btcusdt_1h_data.csv"
    );
    assert_eq!(
        default_file_name("EthBtc", "15m", OutputFormat::Parquet),
        "binance_ethbtc_15m_data.parquet"
    );
}

// ============================================================================
// Encoder Tests
// ============================================================================

#[test]
fn test_encode_csv_has_header_and_rows() {
    let batch = klines_to_batch(&sample(), &TransformConfig::default()).unwrap();
    let data = encode_batch(&batch, OutputFormat::Csv, &ParquetWriterConfig::default()).unwrap();
    let text = String::from_utf8(data.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "OpenTime,Open,High,Low,Close,Volume,CloseTime");
    assert!(lines[1].contains("42475.23"));
    assert!(lines[3].contains("42390"));
}

#[test]
fn test_encode_json_lines() {
    let batch = klines_to_batch(&sample(), &TransformConfig::default()).unwrap();
    let data = encode_batch(&batch, OutputFormat::Json, &ParquetWriterConfig::default()).unwrap();
    let text = String::from_utf8(data.to_vec()).unwrap();

    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Close"], json!(42475.23));
    assert!(rows[0].get("OpenTime").is_some());
}

#[test]
fn test_encode_parquet_reads_back() {
    let batch = klines_to_batch(&sample(), &TransformConfig::all_columns()).unwrap();
    let data = encode_batch(&batch, OutputFormat::Parquet, &ParquetWriterConfig::default()).unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(data)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.collect::<std::result::Result<_, _>>().unwrap();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();

    assert_eq!(rows, 3);
    assert_eq!(batches[0].num_columns(), 12);
    assert_eq!(batches[0].schema().field(8).name(), "NumberOfTrades");
}

#[test]
fn test_parquet_writer_config() {
    let config = ParquetWriterConfig::new()
        .with_row_group_size(2)
        .with_statistics(false)
        .with_compression(ParquetCompression::Zstd);
    assert_eq!(config.row_group_size(), 2);

    let batch = klines_to_batch(&sample(), &TransformConfig::default()).unwrap();
    let mut buf = Vec::new();
    let rows = write_parquet(&mut buf, &batch, &config).unwrap();
    assert_eq!(rows, 3);
    assert!(buf.starts_with(b"PAR1"));

    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(buf)).unwrap();
    let metadata = builder.metadata();
    assert_eq!(metadata.num_row_groups(), 2);
    assert_eq!(metadata.row_group(0).num_rows(), 2);
    assert!(matches!(
        metadata.row_group(0).column(0).compression(),
        Compression::ZSTD(_)
    ));
}

#[test]
fn test_parquet_uncompressed() {
    let config = ParquetWriterConfig::new().with_compression(ParquetCompression::Uncompressed);
    assert_eq!(config.compression(), Compression::UNCOMPRESSED);

    let batch = klines_to_batch(&sample(), &TransformConfig::default()).unwrap();
    let data = encode_batch(&batch, OutputFormat::Parquet, &config).unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(data).unwrap();
    assert_eq!(
        builder.metadata().row_group(0).column(0).compression(),
        Compression::UNCOMPRESSED
    );
}

// ============================================================================
// Destination Tests
// ============================================================================

#[test]
fn test_destination_local() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("out/klines");
    let dest = Destination::parse(nested.to_str().unwrap()).unwrap();

    assert!(!dest.is_cloud());
    assert_eq!(dest.scheme(), "file");
    assert!(nested.is_dir());
}

#[test]
fn test_destination_file_url() {
    let dir = tempdir().unwrap();
    let url = format!("file://{}", dir.path().display());
    let dest = Destination::parse(&url).unwrap();
    assert_eq!(dest.scheme(), "file");
}

#[test]
fn test_destination_unsupported_scheme() {
    let err = Destination::parse("ftp://host/path").unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_destination_missing_bucket() {
    let err = Destination::parse("s3:///prefix").unwrap_err();
    assert!(err.to_string().contains("bucket"));
}

#[tokio::test]
async fn test_destination_write_and_read() {
    let dir = tempdir().unwrap();
    let dest = Destination::parse(dir.path().to_str().unwrap()).unwrap();

    let location = dest
        .write("a.csv", bytes::Bytes::from_static(b"x,y\n1,2\n"))
        .await
        .unwrap();
    assert_eq!(location, format!("{}/a.csv", dir.path().display()));

    let back = dest.read("a.csv").await.unwrap();
    assert_eq!(&back[..], b"x,y\n1,2\n");
    assert!(dir.path().join("a.csv").exists());
}

// ============================================================================
// KlineWriter Tests
// ============================================================================

#[tokio::test]
async fn test_write_klines_csv() {
    let dir = tempdir().unwrap();
    let dest = Destination::parse(dir.path().to_str().unwrap()).unwrap();
    let writer = KlineWriter::new(dest, OutputFormat::Csv);
    let name = default_file_name("BTCUSDT", "1h", writer.format());

    let klines = sample();
    let report = writer.write_klines(&name, &klines).await.unwrap();

    assert_eq!(report.rows, 3);
    assert_eq!(report.format, OutputFormat::Csv);
    assert!(report.bytes > 0);

    let text = std::fs::read_to_string(dir.path().join(&name)).unwrap();
    assert!(text.starts_with("OpenTime,Open,High,Low,Close,Volume,CloseTime"));
    assert_eq!(text.lines().count(), 4);
    // input untouched
    assert_eq!(klines.len(), 3);
}

#[tokio::test]
async fn test_write_klines_selected_columns() {
    let dir = tempdir().unwrap();
    let dest = Destination::parse(dir.path().to_str().unwrap()).unwrap();
    let writer = KlineWriter::new(dest, OutputFormat::Csv).with_transform(TransformConfig {
        columns: vec![crate::transform::KlineColumn::Close],
    });

    writer.write_klines("close.csv", &sample()).await.unwrap();
    let text = std::fs::read_to_string(dir.path().join("close.csv")).unwrap();
    assert_eq!(text.lines().next(), Some("Close"));
}

#[tokio::test]
async fn test_write_klines_bad_record_writes_nothing() {
    let dir = tempdir().unwrap();
    let dest = Destination::parse(dir.path().to_str().unwrap()).unwrap();
    let writer = KlineWriter::new(dest, OutputFormat::Csv);

    let err = writer
        .write_klines("bad.csv", &[kline(T0, "oops")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(!dir.path().join("bad.csv").exists());
}
