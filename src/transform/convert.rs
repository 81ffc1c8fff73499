//! Kline to Arrow conversion

use super::columns::{KlineColumn, DEFAULT_COLUMNS};
use crate::error::{Error, Result};
use crate::types::{JsonValue, Kline};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which columns to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Columns in output order
    pub columns: Vec<KlineColumn>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.to_vec(),
        }
    }
}

impl TransformConfig {
    /// Keep every upstream column
    pub fn all_columns() -> Self {
        Self {
            columns: KlineColumn::ALL.to_vec(),
        }
    }
}

/// Arrow schema for the selected columns
pub fn kline_schema(config: &TransformConfig) -> SchemaRef {
    let fields: Vec<Field> = config
        .columns
        .iter()
        .map(|column| Field::new(column.name(), column.data_type(), false))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Convert klines into a single RecordBatch.
///
/// Records that are too short for a selected column, or whose value for it
/// cannot be coerced, fail the conversion.
pub fn klines_to_batch(klines: &[Kline], config: &TransformConfig) -> Result<RecordBatch> {
    let schema = kline_schema(config);
    if klines.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns = config
        .columns
        .iter()
        .map(|&column| build_column(klines, column))
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn build_column(klines: &[Kline], column: KlineColumn) -> Result<ArrayRef> {
    let array: ArrayRef = match column {
        KlineColumn::OpenTime | KlineColumn::CloseTime => {
            let values = collect(klines, column, as_i64)?;
            Arc::new(TimestampMillisecondArray::from(values).with_timezone("UTC"))
        }
        KlineColumn::NumberOfTrades => Arc::new(Int64Array::from(collect(klines, column, as_i64)?)),
        KlineColumn::Ignore => {
            Arc::new(StringArray::from(collect(klines, column, |v| Some(as_text(v)))?))
        }
        _ => Arc::new(Float64Array::from(collect(klines, column, as_f64)?)),
    };
    Ok(array)
}

fn collect<T>(
    klines: &[Kline],
    column: KlineColumn,
    coerce: impl Fn(&JsonValue) -> Option<T>,
) -> Result<Vec<T>> {
    klines
        .iter()
        .map(|kline| {
            let value = kline.get(column.index()).ok_or_else(|| {
                Error::decode(format!(
                    "kline at {} has {} fields, missing {column}",
                    kline.open_time(),
                    kline.width()
                ))
            })?;
            coerce(value).ok_or_else(|| {
                Error::decode(format!(
                    "kline at {}: {column} value {value} is not numeric",
                    kline.open_time()
                ))
            })
        })
        .collect()
}

fn as_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
