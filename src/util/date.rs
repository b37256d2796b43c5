//! Date parsing and formatting against a declared format

use std::fmt::{self, Write};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Format a date attribute reads and writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 (`2025-10-20T08:30:00+00:00`)
    #[default]
    Rfc3339,
    /// chrono strftime pattern (`%Y-%m-%d`)
    Pattern(String),
}

impl From<&str> for DateFormat {
    fn from(format: &str) -> Self {
        if format.eq_ignore_ascii_case("rfc3339") {
            DateFormat::Rfc3339
        } else {
            DateFormat::Pattern(format.to_string())
        }
    }
}

impl From<String> for DateFormat {
    fn from(format: String) -> Self {
        DateFormat::from(format.as_str())
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Rfc3339 => write!(f, "rfc3339"),
            DateFormat::Pattern(pattern) => write!(f, "{}", pattern),
        }
    }
}

/// A string that does not conform to the expected format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date format ({input} does not conform to {format})")]
pub struct DateError {
    pub input: String,
    pub format: DateFormat,
}

/// Parses `input` against `format`.
///
/// Patterns without an offset are read as UTC; patterns without a time
/// component are read as midnight UTC.
pub fn parse_date(input: &str, format: &DateFormat) -> Result<DateTime<FixedOffset>, DateError> {
    try_parse_date(input, format).ok_or_else(|| DateError {
        input: input.to_string(),
        format: format.clone(),
    })
}

/// Like [`parse_date`], but returns `None` on mismatch
pub fn try_parse_date(input: &str, format: &DateFormat) -> Option<DateTime<FixedOffset>> {
    match format {
        DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(input).ok(),
        DateFormat::Pattern(pattern) => DateTime::parse_from_str(input, pattern)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(input, pattern)
                    .ok()
                    .map(|naive| naive.and_utc().fixed_offset())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(input, pattern)
                    .ok()
                    .map(|day| day.and_time(NaiveTime::MIN).and_utc().fixed_offset())
            }),
    }
}

/// Renders `date` in `format`.
///
/// A pattern chrono cannot render falls back to RFC 3339.
pub fn format_date(date: &DateTime<FixedOffset>, format: &DateFormat) -> String {
    match format {
        DateFormat::Rfc3339 => date.to_rfc3339(),
        DateFormat::Pattern(pattern) => {
            let mut out = String::new();
            match write!(out, "{}", date.format(pattern)) {
                Ok(()) => out,
                Err(_) => date.to_rfc3339(),
            }
        }
    }
}
