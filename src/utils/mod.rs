//! Utility functions and helpers.

pub mod format;
pub mod http;
pub mod log;
pub mod url;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};

/// Suffix that turns a 3-letter code into a city-wide code.
pub const CITY_SUFFIX: &str = "ALL";

/// Turn an airport code into a city-wide code (`IST` → `ISTALL`).
///
/// Codes that already carry the suffix, or are not exactly 3 letters,
/// are returned upper-cased but otherwise unchanged.
pub fn city_code(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code.len() == 3 && !code.ends_with(CITY_SUFFIX) {
        format!("{code}{CITY_SUFFIX}")
    } else {
        code
    }
}

/// Parse a `HH:MM:SS` (or `D.HH:MM:SS`) duration into minutes.
///
/// Returns 0 for anything unparseable or too large to fit.
pub fn parse_duration(time_str: &str) -> u32 {
    let mut parts = time_str.trim().split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return 0;
    };

    let (days, hours) = match hours.split_once('.') {
        Some((days, hours)) => (days, hours),
        None => ("0", hours),
    };

    match (
        days.parse::<u32>(),
        hours.parse::<u32>(),
        minutes.parse::<u32>(),
    ) {
        (Ok(d), Ok(h), Ok(m)) => d
            .checked_mul(24 * 60)
            .zip(h.checked_mul(60))
            .and_then(|(d, h)| d.checked_add(h))
            .and_then(|total| total.checked_add(m))
            .unwrap_or(0),
        _ => 0,
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a backend timestamp into source-local wall time.
///
/// Missing or blank input yields `now`. Offsets are dropped after
/// parsing, keeping the local wall-clock time the backend reported.
pub fn parse_timestamp(raw: Option<&str>, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(now);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(AppError::record(
        "timestamp",
        format!("unrecognized date-time '{raw}'"),
    ))
}
