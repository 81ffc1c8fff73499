//! Tests for kline sources

use super::binance::decode_klines;
use super::*;
use crate::engine::{BatchFetch, BatchRequest, FetchConfig, FetchWindow, PaginationEngine};
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOUR: i64 = 3_600_000;
const T0: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

fn row(open_time: i64) -> serde_json::Value {
    json!([
        open_time,
        "42283.58000000",
        "42554.57000000",
        "42261.02000000",
        "42475.23000000",
        "1271.68108000",
        open_time + HOUR - 1,
        "53957248.97378950",
        47134,
        "682.57581000",
        "28957416.81964880",
        "0"
    ])
}

fn source_for(server: &MockServer) -> BinanceKlineSource {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(0)
        .no_rate_limit()
        .build();
    BinanceKlineSource::new(HttpClient::with_config(config).unwrap())
}

fn request(from_ms: i64, to_ms: i64, limit: u32) -> BatchRequest {
    BatchRequest::new("BTCUSDT", "1h", FetchWindow::new(from_ms, to_ms), limit)
}

// ============================================================================
// Decoding Tests
// ============================================================================

#[test]
fn test_decode_klines() {
    let klines = decode_klines(json!([row(T0), row(T0 + HOUR)])).unwrap();
    assert_eq!(klines.len(), 2);
    assert_eq!(klines[0].open_time(), T0);
    assert_eq!(klines[1].width(), 12);
    assert_eq!(klines[1].get(8), Some(&json!(47134)));
}

#[test]
fn test_decode_klines_empty() {
    assert!(decode_klines(json!([])).unwrap().is_empty());
}

#[test]
fn test_decode_klines_rejects_error_object() {
    let err = decode_klines(json!({"code": -1121, "msg": "Invalid symbol."})).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("an object"));
}

#[test]
fn test_decode_klines_rejects_bad_row() {
    let err = decode_klines(json!([row(T0), "oops"])).unwrap_err();
    assert!(err.to_string().contains("kline 1"));

    let err = decode_klines(json!([[null, "1.0"]])).unwrap_err();
    assert!(err.to_string().contains("kline 0"));
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_batch_sends_window_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("startTime", T0.to_string()))
        .and(query_param("endTime", (T0 + 10 * HOUR).to_string()))
        .and(query_param("limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(T0), row(T0 + HOUR)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    let klines = source
        .fetch_batch(&request(T0, T0 + 10 * HOUR, 500))
        .await
        .unwrap();

    assert_eq!(klines.len(), 2);
}

#[tokio::test]
async fn test_fetch_batch_custom_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(T0)])))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server).with_config(BinanceSourceConfig {
        klines_path: "/fapi/v1/klines".to_string(),
    });
    let klines = source
        .fetch_batch(&request(T0, T0 + HOUR, 1000))
        .await
        .unwrap();

    assert_eq!(klines.len(), 1);
}

#[tokio::test]
async fn test_fetch_batch_http_error_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    let err = source
        .fetch_batch(&request(T0, T0 + HOUR, 1000))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));
}

#[tokio::test]
async fn test_engine_over_mock_exchange() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("startTime", T0.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([row(T0), row(T0 + HOUR), row(T0 + 2 * HOUR)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("startTime", (T0 + 3 * HOUR).to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(T0 + 3 * HOUR)])))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server);
    let engine = PaginationEngine::new().with_config(
        FetchConfig::new()
            .with_limit(3)
            .with_batch_delay(Duration::ZERO),
    );

    let records = engine
        .fetch_all("BTCUSDT", "1h", T0, T0 + 24 * HOUR, &source)
        .await
        .unwrap();

    let open_times: Vec<i64> = records.iter().map(|k| k.open_time()).collect();
    assert_eq!(open_times, vec![T0, T0 + HOUR, T0 + 2 * HOUR, T0 + 3 * HOUR]);
}
