//! Date and time text decoders.
//!
//! The server sends temporal values as text:
//! - DATE: `YYYY-MM-DD`
//! - DATETIME/TIMESTAMP: `YYYY-MM-DD HH:MM:SS[.ffffff]`
//! - TIME: `[-]H:MM:SS[.ffffff]`, hours may exceed 24
//!
//! DATE/DATETIME/TIMESTAMP are read as a UTC wall-clock reading. TIME becomes
//! the instant that many seconds after the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a DATE/DATETIME/TIMESTAMP text value as UTC.
///
/// Returns `None` for zero dates (`0000-00-00`) and anything else that does
/// not name a real instant.
pub fn parse_datetime_utc(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parse a TIME text value into signed elapsed seconds.
///
/// Components are read like `%d:%d:%d`: each carries its own sign, missing
/// components count as zero, and parsing stops at the first component that
/// is not an integer. Fractional seconds are dropped. Returns `None` if the
/// total does not fit in an `i64`.
pub fn parse_time_seconds(text: &str) -> Option<i64> {
    let mut parts = [0i64; 3];

    for (slot, component) in parts.iter_mut().zip(text.trim().split(':')) {
        let digits = leading_integer(component);
        match digits.parse::<i64>() {
            Ok(v) => *slot = v,
            Err(_) => break,
        }
        if digits.len() != component.len() {
            // trailing text such as ".123456" ends the scan
            break;
        }
    }

    parts[0]
        .checked_mul(3600)?
        .checked_add(parts[1].checked_mul(60)?)?
        .checked_add(parts[2])
}

/// Parse a TIME text value as an instant past the Unix epoch.
pub fn parse_time_of_day(text: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(parse_time_seconds(text)?, 0)
}

/// Longest prefix that looks like an optionally signed integer.
fn leading_integer(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_datetime() {
        let dt = parse_datetime_utc("2024-01-15 10:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.timestamp(), 1_705_314_600);
    }

    #[test]
    fn test_parse_datetime_fraction() {
        let dt = parse_datetime_utc("2024-01-15 10:30:00.250000").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_datetime_utc("1999-06-15").unwrap();
        assert_eq!(dt.year(), 1999);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_zero_date() {
        assert_eq!(parse_datetime_utc("0000-00-00 00:00:00"), None);
        assert_eq!(parse_datetime_utc("0000-00-00"), None);
    }

    #[test]
    fn test_parse_time_seconds() {
        assert_eq!(parse_time_seconds("10:30:00"), Some(37_800));
        assert_eq!(parse_time_seconds("838:59:59"), Some(3_020_399));
        assert_eq!(parse_time_seconds("-01:30:00"), Some(-1800));
        assert_eq!(parse_time_seconds("00:00:01.500000"), Some(1));
        assert_eq!(parse_time_seconds("12"), Some(43_200));
    }

    #[test]
    fn test_parse_time_seconds_overflow() {
        assert_eq!(parse_time_seconds("3000000000000000:00:00"), None);
        assert_eq!(parse_time_seconds("0:9223372036854775807:00"), None);
        assert_eq!(parse_time_of_day("3000000000000000:00:00"), None);
    }

    #[test]
    fn test_parse_time_of_day() {
        let t = parse_time_of_day("10:30:15").unwrap();
        assert_eq!(t.timestamp(), 37_815);
        assert_eq!(t.hour(), 10);
        assert_eq!(t.second(), 15);
    }
}
