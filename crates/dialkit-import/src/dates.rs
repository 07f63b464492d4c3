//! Reference-date parsing for conditional import validation.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Attempts to interpret a raw field value as a date.
///
/// Accepted forms, tried in order:
/// 1. RFC 3339 strings (`"2026-03-01T09:30:00Z"`)
/// 2. `YYYY-MM-DD` date strings, taken as midnight UTC
/// 3. `MM/DD/YYYY` date strings, taken as midnight UTC
/// 4. JSON numbers, taken as epoch milliseconds
///
/// Returns `None` for anything else, including booleans, arrays, and
/// strings no format matches.
#[must_use]
pub fn parse_reference_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}
