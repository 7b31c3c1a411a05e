//! Cell-level parsing helpers shared by the loader and the cleaner.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Parse a number, tolerating surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when the value parses as a whole number (no fractional part).
pub fn is_integral(raw: &str) -> bool {
    raw.trim().parse::<i64>().is_ok()
}

/// Parse a day-first date using the given formats in order.
///
/// A trailing time of day (`01/05/2005 17:42`) is accepted and discarded.
pub fn parse_day_first_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in formats {
        for suffix in [" %H:%M:%S", " %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, &format!("{fmt}{suffix}")) {
                return Some(dt.date());
            }
        }
    }
    None
}

/// Extract the hour from a time-of-day string, `None` when it does not match.
pub fn parse_hour(raw: &str, format: &str) -> Option<u32> {
    NaiveTime::parse_from_str(raw.trim(), format)
        .ok()
        .map(|t| t.hour())
}
