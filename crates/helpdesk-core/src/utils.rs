//! Utility functions for the helpdesk dashboard

use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Display format for timestamps in tables
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string from the export
///
/// Values carrying an offset are converted to UTC; values without one are
/// taken as UTC. A bare date is midnight.
///
/// # Errors
///
/// Returns [`crate::Error::Timestamp`] if no accepted format matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| crate::Error::Timestamp {
            value: value.to_string(),
        })
}

/// Serde adapter parsing a timestamp string with [`parse_timestamp`]
///
/// # Errors
///
/// Returns a deserialization error if the value is not a string or is not a
/// recognized timestamp.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Round to a fixed number of decimal places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Convert a time delta to fractional days
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn delta_to_days(delta: chrono::TimeDelta) -> f64 {
    let seconds = delta.num_seconds() as f64
        + f64::from(delta.subsec_nanos()) / 1_000_000_000.0;
    seconds / SECONDS_PER_DAY
}

/// Format a timestamp for display
#[must_use]
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_DISPLAY_FORMAT).to_string()
}
