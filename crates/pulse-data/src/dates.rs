//! Lenient date parsing for heterogeneous inputs.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::{DataError, Result};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a calendar date out of a date, datetime, RFC 3339 or RFC 2822 string.
///
/// Timestamps keep their local calendar day; the time of day is discarded.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DataError::InvalidDate(raw.to_string()));
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    // Fractional seconds or odd offsets: the leading ISO date is enough
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .ok_or_else(|| DataError::InvalidDate(raw.to_string()))
}

/// Days between 0001-01-01 and 1970-01-01, the epoch of polars dates
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days since the Unix epoch, the physical value of a polars `Date`
pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Calendar date of an epoch day count
pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

/// Format a date the way every output table writes it
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_days() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(epoch_days(date), 19_723);
        assert_eq!(from_epoch_days(19_723), Some(date));
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_date() {
        assert_eq!(parse_date("2024-03-15").unwrap(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(
            parse_date("2024-03-15T08:30:00+01:00").unwrap(),
            ymd(2024, 3, 15)
        );
        assert_eq!(
            parse_date("Fri, 15 Mar 2024 08:30:00 +0000").unwrap(),
            ymd(2024, 3, 15)
        );
        assert_eq!(parse_date("2024-03-15 23:59:59").unwrap(), ymd(2024, 3, 15));
        assert_eq!(
            parse_date("2024-03-15T08:30:00.123456").unwrap(),
            ymd(2024, 3, 15)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_date("").is_err());
        assert!(parse_date("yesterday").is_err());
    }
}
