//! HTTP client module
//!
//! Provides the HTTP client used by kline sources.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx, timeouts and connection errors are retried with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
