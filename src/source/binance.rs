//! Binance-compatible `/api/v3/klines` source

use crate::engine::{BatchFetch, BatchRequest};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{JsonValue, Kline};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Public Binance REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Kline endpoint path
pub const KLINES_PATH: &str = "/api/v3/klines";

/// Settings for [`BinanceKlineSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinanceSourceConfig {
    /// Path of the klines endpoint, relative to the client's base URL
    pub klines_path: String,
}

impl Default for BinanceSourceConfig {
    fn default() -> Self {
        Self {
            klines_path: KLINES_PATH.to_string(),
        }
    }
}

/// Fetches klines from a Binance-compatible REST API.
///
/// The response is a JSON array of fixed-width arrays whose first element is
/// the open time in epoch milliseconds. Rows are kept verbatim.
#[derive(Debug)]
pub struct BinanceKlineSource {
    client: HttpClient,
    config: BinanceSourceConfig,
}

impl BinanceKlineSource {
    /// Create a source over an HTTP client whose base URL points at the exchange
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            config: BinanceSourceConfig::default(),
        }
    }

    /// Override source settings
    #[must_use]
    pub fn with_config(mut self, config: BinanceSourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request_config(request: &BatchRequest) -> RequestConfig {
        RequestConfig::new()
            .query("symbol", &request.symbol)
            .query("interval", &request.interval)
            .query("startTime", request.from_ms)
            .query("endTime", request.to_ms)
            .query("limit", request.limit)
    }

    async fn fetch(&self, request: &BatchRequest) -> Result<Vec<Kline>> {
        let body: JsonValue = self
            .client
            .get_json(&self.config.klines_path, Self::request_config(request))
            .await?;
        decode_klines(body)
    }
}

#[async_trait]
impl BatchFetch for BinanceKlineSource {
    async fn fetch_batch(&self, request: &BatchRequest) -> Result<Vec<Kline>> {
        match self.fetch(request).await {
            Ok(klines) => {
                debug!(
                    symbol = %request.symbol,
                    from_ms = request.from_ms,
                    count = klines.len(),
                    "Decoded klines"
                );
                Ok(klines)
            }
            Err(e) => {
                warn!(
                    symbol = %request.symbol,
                    interval = %request.interval,
                    from_ms = request.from_ms,
                    error = %e,
                    "Error fetching klines"
                );
                Err(e)
            }
        }
    }
}

/// Decode a klines response body into records.
///
/// The body must be an array of arrays. Any row that is not an array or whose
/// first element is not an integer open time fails the whole batch.
pub(crate) fn decode_klines(body: JsonValue) -> Result<Vec<Kline>> {
    let JsonValue::Array(rows) = body else {
        return Err(Error::decode(format!(
            "expected an array of klines, got {}",
            describe(&body)
        )));
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            JsonValue::Array(values) => Kline::from_values(values)
                .map_err(|e| Error::decode(format!("kline {index}: {e}"))),
            other => Err(Error::decode(format!(
                "kline {index} is {}, expected an array",
                describe(&other)
            ))),
        })
        .collect()
}

fn describe(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
