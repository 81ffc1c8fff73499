//! Interval token parsing

use crate::error::{Error, Result};
use std::fmt;
use tracing::warn;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Step used when the interval unit is not recognized (one hour)
pub const DEFAULT_STEP_MS: i64 = HOUR_MS;

/// Recognized interval units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    /// `m`
    Minutes,
    /// `h`
    Hours,
    /// `d`
    Days,
}

impl IntervalUnit {
    fn from_suffix(suffix: char) -> Option<Self> {
        match suffix {
            'm' => Some(Self::Minutes),
            'h' => Some(Self::Hours),
            'd' => Some(Self::Days),
            _ => None,
        }
    }

    /// Length of one unit in milliseconds
    pub fn millis(self) -> i64 {
        match self {
            Self::Minutes => MINUTE_MS,
            Self::Hours => HOUR_MS,
            Self::Days => DAY_MS,
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self {
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
        };
        f.write_str(suffix)
    }
}

/// Resolved step for an interval token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalStep {
    /// Step length in milliseconds
    pub millis: i64,
    /// The recognized unit, or `None` when the default was substituted
    pub unit: Option<IntervalUnit>,
}

impl IntervalStep {
    /// True when the token's unit was not recognized and the one-hour default applies
    pub fn is_fallback(&self) -> bool {
        self.unit.is_none()
    }
}

/// Resolve an interval token into a step.
///
/// The unit is the trailing character. For `m`, `h` and `d` the remaining
/// prefix must be a positive integer, otherwise `InvalidIntervalFormat` is
/// returned. Any other unit yields the one-hour default with `unit: None`.
pub fn parse_interval(token: &str) -> Result<IntervalStep> {
    let Some(unit) = token.chars().last().and_then(IntervalUnit::from_suffix) else {
        return Ok(IntervalStep {
            millis: DEFAULT_STEP_MS,
            unit: None,
        });
    };

    let prefix = &token[..token.len() - 1];
    let multiplier: i64 = prefix.parse().map_err(|_| {
        Error::invalid_interval(token, format!("multiplier '{prefix}' is not an integer"))
    })?;

    if multiplier <= 0 {
        return Err(Error::invalid_interval(
            token,
            "multiplier must be a positive integer",
        ));
    }

    let millis = multiplier
        .checked_mul(unit.millis())
        .ok_or_else(|| Error::invalid_interval(token, "step overflows epoch milliseconds"))?;

    Ok(IntervalStep {
        millis,
        unit: Some(unit),
    })
}

/// Step duration in milliseconds for an interval token.
///
/// Logs a warning when the one-hour default is substituted.
pub fn duration_millis(token: &str) -> Result<i64> {
    let step = parse_interval(token)?;
    if step.is_fallback() {
        warn!(
            interval = token,
            default_ms = DEFAULT_STEP_MS,
            "Unknown interval unit, defaulting to 1 hour for pagination"
        );
    }
    Ok(step.millis)
}
