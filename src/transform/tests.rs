//! Tests for transform module

use super::*;
use crate::error::Error;
use crate::types::Kline;
use arrow::array::{Array, Float64Array, Int64Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use serde_json::json;

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

#[test]
fn test_default_schema() {
    let schema = kline_schema(&TransformConfig::default());
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(
        names,
        vec!["OpenTime", "Open", "High", "Low", "Close", "Volume", "CloseTime"]
    );
    assert_eq!(
        schema.field(0).data_type(),
        &DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
    );
    assert_eq!(schema.field(4).data_type(), &DataType::Float64);
}

#[test]
fn test_klines_to_batch_coerces_values() {
    let klines = vec![kline(T0, "42475.23"), kline(T0 + 3_600_000, "42500")];
    let batch = klines_to_batch(&klines, &TransformConfig::default()).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 7);

    let open_time = batch
        .column(0)
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .unwrap();
    assert_eq!(open_time.value(1), T0 + 3_600_000);

    let close = batch
        .column(4)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((close.value(0) - 42475.23).abs() < 1e-9);
    assert!((close.value(1) - 42500.0).abs() < 1e-9);

    let close_time = batch
        .column(6)
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .unwrap();
    assert_eq!(close_time.value(0), T0 + 3_599_999);
}

#[test]
fn test_all_columns() {
    let batch = klines_to_batch(&[kline(T0, "1.0")], &TransformConfig::all_columns()).unwrap();
    assert_eq!(batch.num_columns(), 12);

    let trades = batch
        .column(KlineColumn::NumberOfTrades.index())
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(trades.value(0), 47134);
}

#[test]
fn test_custom_column_order() {
    let config = TransformConfig {
        columns: vec![KlineColumn::Close, KlineColumn::OpenTime],
    };
    let batch = klines_to_batch(&[kline(T0, "7.5")], &config).unwrap();
    assert_eq!(batch.schema().field(0).name(), "Close");
    assert_eq!(batch.column(1).len(), 1);
}

#[test]
fn test_empty_input_keeps_schema() {
    let batch = klines_to_batch(&[], &TransformConfig::default()).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 7);
}

#[test]
fn test_non_numeric_value_fails() {
    let err = klines_to_batch(&[kline(T0, "n/a")], &TransformConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("Close"));
}

#[test]
fn test_short_record_fails() {
    let short = Kline::from_values(vec![json!(T0), json!("1.0"), json!("2.0")]).unwrap();
    let err = klines_to_batch(&[short], &TransformConfig::default()).unwrap_err();
    assert!(err.to_string().contains("missing Low"));
}

#[test]
fn test_column_indices_follow_wire_order() {
    for (position, column) in KlineColumn::ALL.iter().enumerate() {
        assert_eq!(column.index(), position);
    }
    assert_eq!(KlineColumn::TakerBuyQuoteAssetVolume.to_string(), "TakerBuyQuoteAssetVolume");
}
