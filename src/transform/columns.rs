//! Positional column layout of an upstream kline

use arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of the upstream kline tuple, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineColumn {
    /// Candle open time, epoch milliseconds
    OpenTime,
    /// First trade price
    Open,
    /// Highest trade price
    High,
    /// Lowest trade price
    Low,
    /// Last trade price
    Close,
    /// Base asset volume
    Volume,
    /// Candle close time, epoch milliseconds
    CloseTime,
    /// Quote asset volume
    QuoteAssetVolume,
    /// Trade count
    NumberOfTrades,
    /// Base asset volume bought by takers
    TakerBuyBaseAssetVolume,
    /// Quote asset volume bought by takers
    TakerBuyQuoteAssetVolume,
    /// Unused trailing field, kept as text
    Ignore,
}

/// Columns kept when none are configured
pub const DEFAULT_COLUMNS: [KlineColumn; 7] = [
    KlineColumn::OpenTime,
    KlineColumn::Open,
    KlineColumn::High,
    KlineColumn::Low,
    KlineColumn::Close,
    KlineColumn::Volume,
    KlineColumn::CloseTime,
];

impl KlineColumn {
    /// Every column in wire order
    pub const ALL: [KlineColumn; 12] = [
        KlineColumn::OpenTime,
        KlineColumn::Open,
        KlineColumn::High,
        KlineColumn::Low,
        KlineColumn::Close,
        KlineColumn::Volume,
        KlineColumn::CloseTime,
        KlineColumn::QuoteAssetVolume,
        KlineColumn::NumberOfTrades,
        KlineColumn::TakerBuyBaseAssetVolume,
        KlineColumn::TakerBuyQuoteAssetVolume,
        KlineColumn::Ignore,
    ];

    /// Position in the raw tuple
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column header
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenTime => "OpenTime",
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::CloseTime => "CloseTime",
            Self::QuoteAssetVolume => "QuoteAssetVolume",
            Self::NumberOfTrades => "NumberOfTrades",
            Self::TakerBuyBaseAssetVolume => "TakerBuyBaseAssetVolume",
            Self::TakerBuyQuoteAssetVolume => "TakerBuyQuoteAssetVolume",
            Self::Ignore => "Ignore",
        }
    }

    /// Arrow type the column is coerced to
    pub fn data_type(self) -> DataType {
        match self {
            Self::OpenTime | Self::CloseTime => {
                DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
            }
            Self::NumberOfTrades => DataType::Int64,
            Self::Ignore => DataType::Utf8,
            _ => DataType::Float64,
        }
    }
}

impl fmt::Display for KlineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
