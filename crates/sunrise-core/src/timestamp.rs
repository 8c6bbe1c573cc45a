//! Timestamp extraction for Sunshine log lines.
//!
//! Sunshine prefixes every entry with a local wall-clock timestamp:
//!
//! ```text
//! [2024-01-01 10:00:00.000]: Error: Couldn't find monitor
//! ```
//!
//! Only that exact shape is accepted. Anything else is a [`TimestampError`],
//! which callers treat as "skip this line", never as a fatal condition.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Timelike};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// `chrono` format matching the bracketed body once its shape is verified.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

static SHAPE_RE: OnceLock<Regex> = OnceLock::new();

fn shape_re() -> &'static Regex {
    SHAPE_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}$")
            .expect("static regex")
    })
}

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("log line does not start with '['")]
    MissingOpenBracket,

    #[error("log line has no closing ']'")]
    MissingCloseBracket,

    #[error("'{0}' is not of the form YYYY-MM-DD HH:MM:SS.mmm")]
    Malformed(String),

    #[error("'{raw}' is not a valid date-time: {source}")]
    InvalidDate {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("'{0}' has a second value outside 00-59")]
    SecondOutOfRange(String),

    #[error("'{0}' does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Parse the leading `[YYYY-MM-DD HH:MM:SS.mmm]` of `line` as local time.
pub fn parse_timestamp(line: &str) -> Result<DateTime<Local>, TimestampError> {
    parse_timestamp_in(line, &Local)
}

/// Same as [`parse_timestamp`] but interprets the wall-clock value in `tz`.
///
/// A value that occurs twice (DST fold) resolves to the earlier instant.
pub fn parse_timestamp_in<Tz: TimeZone>(
    line: &str,
    tz: &Tz,
) -> Result<DateTime<Tz>, TimestampError> {
    let naive = parse_naive(line)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(TimestampError::NonexistentLocalTime(naive.to_string())),
    }
}

fn parse_naive(line: &str) -> Result<NaiveDateTime, TimestampError> {
    let Some(rest) = line.strip_prefix('[') else {
        return Err(TimestampError::MissingOpenBracket);
    };
    let Some(end) = rest.find(']') else {
        return Err(TimestampError::MissingCloseBracket);
    };
    let raw = &rest[..end];

    if !shape_re().is_match(raw) {
        return Err(TimestampError::Malformed(raw.to_string()));
    }

    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| {
        TimestampError::InvalidDate {
            raw: raw.to_string(),
            source,
        }
    })?;

    // chrono reads second 60 as a leap second, stored as an overflowing nanosecond.
    if naive.nanosecond() >= 1_000_000_000 {
        return Err(TimestampError::SecondOutOfRange(raw.to_string()));
    }
    Ok(naive)
}
