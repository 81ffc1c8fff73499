//! Interval module
//!
//! Maps kline interval tokens (`"15m"`, `"1h"`, `"1d"`) to fixed step
//! durations in milliseconds.
//!
//! # Overview
//!
//! The step is what the engine adds to the last confirmed open time to
//! compute the next fetch window. Unknown units fall back to one hour so
//! a new upstream interval does not stop a backfill; a malformed
//! multiplier is always fatal.

mod clock;

pub use clock::{duration_millis, parse_interval, IntervalStep, IntervalUnit, DEFAULT_STEP_MS};

#[cfg(test)]
mod tests;
