//! Calendar features derived from observation timestamps.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Accepted naive timestamp layouts, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse an observation timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the `T`-separated form, RFC 3339 (the
/// local wall-clock time is kept, the offset is dropped), and bare dates
/// (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Hour-of-day, day-of-month, month, and day-of-year of one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub day_of_year: u32,
}

impl CalendarFeatures {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            hour: dt.hour(),
            day: dt.day(),
            month: dt.month(),
            day_of_year: dt.ordinal(),
        }
    }

    /// Parse `raw` and derive its calendar features.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_timestamp(raw).map(|dt| Self::from_datetime(&dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minute_precision() {
        let cal = CalendarFeatures::parse("2025-01-01 09:00").unwrap();
        assert_eq!(
            cal,
            CalendarFeatures {
                hour: 9,
                day: 1,
                month: 1,
                day_of_year: 1
            }
        );
    }

    #[test]
    fn test_parse_single_digit_hour() {
        let cal = CalendarFeatures::parse("2024-03-05 7:15").unwrap();
        assert_eq!(cal.hour, 7);
        assert_eq!(cal.day_of_year, 65);
    }

    #[test]
    fn test_leap_year_day_of_year() {
        let cal = CalendarFeatures::parse("2024-12-31T23:59:59").unwrap();
        assert_eq!(cal.day_of_year, 366);
        assert_eq!(cal.month, 12);
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock() {
        let cal = CalendarFeatures::parse("2025-06-15T14:30:00+07:00").unwrap();
        assert_eq!(cal.hour, 14);
        assert_eq!(cal.month, 6);
    }

    #[test]
    fn test_bare_date_is_midnight() {
        let cal = CalendarFeatures::parse("2025-02-10").unwrap();
        assert_eq!(cal.hour, 0);
        assert_eq!(cal.day, 10);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(CalendarFeatures::parse("not a date").is_none());
        assert!(CalendarFeatures::parse("2025-13-01 10:00").is_none());
    }
}
