//! Date parsing for raw field values.
//!
//! Sources export dates as text in many layouts. Anything that parses into a
//! calendar date becomes a [`NaiveDateTime`]; year-only and purely numeric
//! values are never treated as dates. Offset-stamped values (RFC 3339,
//! RFC 2822) are normalized to UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use patmine_model::Value;

const DATETIME_FORMATS: [&str; 11] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",  // 15-Jan-2024
    "%d-%B-%Y",  // 15-January-2024
    "%m/%d/%Y",  // US: 01/15/2024
    "%d/%m/%Y",  // European: 15/01/2024
    "%d.%m.%Y",  // 15.01.2024
    "%b %d, %Y", // Jan 15, 2024
    "%B %d, %Y", // January 15, 2024
    "%d %b %Y",  // 15 Jan 2024
    "%d %B %Y",  // 15 January 2024
    "%Y-%b-%d",  // 2024-Jan-15
];

/// Parse a date or datetime string.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Some(parsed);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Date view of a field value: dates as-is, text parsed, everything else none.
pub fn value_to_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(date) => Some(*date),
        Value::Text(text) => parse_date(text),
        _ => None,
    }
}

/// Calendar parts derived from a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    /// 1-4.
    pub quarter: u32,
    /// 0 = Sunday.
    pub day_of_week: u32,
}

impl DateParts {
    pub fn of(date: NaiveDateTime) -> Self {
        let month = date.month();
        Self {
            year: date.year(),
            month,
            quarter: month.div_ceil(3),
            day_of_week: date.weekday().num_days_from_sunday(),
        }
    }
}
