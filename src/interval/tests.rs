//! Tests for interval module

use super::*;
use crate::error::Error;
use test_case::test_case;

#[test_case("1m", 60_000 ; "one minute")]
#[test_case("15m", 900_000 ; "fifteen minutes")]
#[test_case("1h", 3_600_000 ; "one hour")]
#[test_case("2h", 7_200_000 ; "two hours")]
#[test_case("12h", 43_200_000 ; "twelve hours")]
#[test_case("1d", 86_400_000 ; "one day")]
#[test_case("3d", 259_200_000 ; "three days")]
fn test_known_units(token: &str, expected: i64) {
    assert_eq!(duration_millis(token).unwrap(), expected);
}

#[test]
fn test_duration_is_pure() {
    let first = duration_millis("4h").unwrap();
    let second = duration_millis("4h").unwrap();
    assert_eq!(first, second);
}

#[test_case("3x" ; "unknown unit")]
#[test_case("1w" ; "weeks are not a recognized unit")]
#[test_case("1M" ; "months are not a recognized unit")]
#[test_case("" ; "empty token")]
#[test_case("hourly" ; "word without multiplier")]
fn test_unknown_unit_falls_back_to_one_hour(token: &str) {
    assert_eq!(duration_millis(token).unwrap(), 3_600_000);

    let step = parse_interval(token).unwrap();
    assert!(step.is_fallback());
    assert_eq!(step.millis, DEFAULT_STEP_MS);
}

#[test_case("xh" ; "non numeric hours")]
#[test_case("m" ; "missing multiplier")]
#[test_case("1.5h" ; "fractional multiplier")]
#[test_case("0d" ; "zero multiplier")]
#[test_case("-5m" ; "negative multiplier")]
fn test_malformed_multiplier_is_fatal(token: &str) {
    let err = duration_millis(token).unwrap_err();
    assert!(matches!(err, Error::InvalidIntervalFormat { .. }));
}

#[test]
fn test_overflowing_multiplier_is_fatal() {
    let err = parse_interval("9223372036854775807d").unwrap_err();
    assert!(matches!(err, Error::InvalidIntervalFormat { .. }));
}

#[test]
fn test_parse_interval_reports_unit() {
    let step = parse_interval("30m").unwrap();
    assert_eq!(step.unit, Some(IntervalUnit::Minutes));
    assert!(!step.is_fallback());
    assert_eq!(step.unit.unwrap().to_string(), "m");
}

/// Shared buffer for formatted log output
#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.contents())
}

#[test]
fn test_fallback_logs_warning() {
    let (millis, logs) = with_captured_logs(|| duration_millis("1w"));

    assert_eq!(millis.unwrap(), 3_600_000);
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("defaulting to 1 hour"), "{logs}");
    assert!(logs.contains("1w"), "{logs}");
}

#[test]
fn test_known_unit_logs_nothing() {
    let (millis, logs) = with_captured_logs(|| duration_millis("4h"));

    assert_eq!(millis.unwrap(), 14_400_000);
    assert!(logs.is_empty(), "{logs}");
}
