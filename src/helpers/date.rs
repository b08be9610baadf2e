//! Date helper functions

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone,
};
use chrono_tz::Tz;

/// Formats that carry their own UTC offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Wall-clock formats, resolved in the configured timezone
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a front-matter date string.
///
/// Values with an explicit offset (or `Z`) keep it. Values without one are
/// read as wall-clock time in `tz`; date-only values mean midnight. Returns
/// `None` for anything unparseable, including local times skipped by a
/// daylight-saving transition.
///
/// # Examples
/// ```ignore
/// parse_post_date("2025-12-09T15:34:46.203", chrono_tz::UTC) // -> 2025-12-09T15:34:46.203+00:00
/// ```
pub fn parse_post_date(s: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return localize(naive, tz);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return localize(d.and_hms_opt(0, 0, 0)?, tz);
        }
    }

    None
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let dt = tz.from_local_datetime(&naive).earliest()?;
    Some(dt.with_timezone(&dt.offset().fix()))
}

/// Format a date in ISO 8601 / RFC 3339 form for the manifest
pub fn date_xml(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> Option<DateTime<FixedOffset>> {
        parse_post_date(s, chrono_tz::UTC)
    }

    #[test]
    fn test_naive_datetime_with_millis() {
        let dt = utc("2025-12-09T15:34:46.203").unwrap();
        assert_eq!(date_xml(&dt), "2025-12-09T15:34:46.203+00:00");
    }

    #[test]
    fn test_explicit_offset_is_kept() {
        let dt = utc("2025-12-09T15:34:46+05:30").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 5 * 3600 + 30 * 60);

        let dt = utc("2025-12-09T15:34:46.5Z").unwrap();
        assert_eq!(date_xml(&dt), "2025-12-09T15:34:46.500+00:00");

        let dt = utc("2025-12-09 15:34:46+0100").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_date_only_and_short_forms() {
        assert_eq!(
            date_xml(&utc("2025-11-28").unwrap()),
            "2025-11-28T00:00:00+00:00"
        );
        assert_eq!(
            date_xml(&utc("2024/01/15 10:30").unwrap()),
            "2024-01-15T10:30:00+00:00"
        );
        assert_eq!(
            date_xml(&utc("2024-01-15 10:30:00").unwrap()),
            "2024-01-15T10:30:00+00:00"
        );
    }

    #[test]
    fn test_naive_dates_use_configured_zone() {
        let dt = parse_post_date("2025-07-01 12:00", chrono_tz::Europe::Berlin).unwrap();
        assert_eq!(date_xml(&dt), "2025-07-01T12:00:00+02:00");

        // 02:30 does not exist in Berlin on the spring-forward day
        assert!(parse_post_date("2025-03-30 02:30", chrono_tz::Europe::Berlin).is_none());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(utc("").is_none());
        assert!(utc("yesterday").is_none());
        assert!(utc("2025-13-01").is_none());
        assert!(utc("2025-02-30").is_none());
    }

    #[test]
    fn test_offsets_compare_as_instants() {
        let a = utc("2025-12-09T10:00:00+02:00").unwrap();
        let b = utc("2025-12-09T09:00:00Z").unwrap();
        assert!(a < b);
    }
}
