//! Best-effort publish date parsing.
//!
//! Feeds in the wild rarely stick to RFC 2822, so `parse_date` walks a list
//! of known layouts and returns the first match. Datetimes without an offset
//! are taken as UTC. Unrecognized text yields `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Layouts carrying an explicit offset, tried after RFC 2822 and RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %:z",
    "%a %b %d %H:%M:%S %z %Y",
];

/// Layouts without an offset (interpreted as UTC).
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%a %b %e %H:%M:%S UTC %Y",
    "%a %b %e %H:%M:%S GMT %Y",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%B %d, %Y",
    "%d %B %Y",
    "%b %d %Y",
];

/// Parses a feed date string into UTC.
///
/// Accepts RFC 2822 (with or without weekday, obsolete zone names such as
/// `GMT` or `EST`), RFC 3339, common ISO-8601 variants, plain dates, long
/// English dates like `September 6, 2009`, Unix `date` output, and Unix
/// timestamps in seconds or milliseconds.
/// A weekday that disagrees with the date is ignored rather than rejected.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_any(s).or_else(|| strip_weekday(s).and_then(parse_any))
}

fn parse_any(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // "UTC" and a bare "Z" are common but not valid RFC 2822 zones
    if let Some(normalized) = normalize_utc_suffix(s) {
        if let Ok(dt) = DateTime::parse_from_rfc2822(&normalized) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Some(dt) = parse_with_offset(&normalized) {
            return Some(dt);
        }
    }

    if let Some(dt) = parse_with_offset(s) {
        return Some(dt);
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    parse_unix_seconds(s)
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn normalize_utc_suffix(s: &str) -> Option<String> {
    ["UTC", "Z"].iter().find_map(|zone| {
        let head = s.strip_suffix(zone)?;
        if head.ends_with(' ') {
            Some(format!("{head}+0000"))
        } else {
            None
        }
    })
}

/// Drops a leading `Sun,` style weekday.
fn strip_weekday(s: &str) -> Option<&str> {
    let (head, rest) = s.split_once(',')?;
    let head = head.trim();
    if head.len() >= 3 && head.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn parse_unix_seconds(s: &str) -> Option<DateTime<Utc>> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = s.parse().ok()?;
    // 9-10 digits cover 1973..2286 in seconds, 13 digits the same span in
    // milliseconds. Other lengths are compact dates or noise.
    match s.len() {
        9 | 10 => DateTime::from_timestamp(value, 0),
        13 => DateTime::from_timestamp_millis(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_date("Sun, 06 Sep 2009 16:20:00 +0000"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_rfc2822_named_zone_and_offset() {
        assert_eq!(
            parse_date("Tue, 10 Jun 2003 04:00:00 GMT"),
            Some(utc(2003, 6, 10, 4, 0, 0))
        );
        assert_eq!(
            parse_date("Tue, 10 Jun 2003 09:41:01 -0500"),
            Some(utc(2003, 6, 10, 14, 41, 1))
        );
    }

    #[test]
    fn test_rfc2822_utc_suffix() {
        assert_eq!(
            parse_date("Sun, 6 Sep 2009 16:20:00 UTC"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_wrong_weekday_is_ignored() {
        // 6 Sep 2009 was a Sunday
        assert_eq!(
            parse_date("Mon, 06 Sep 2009 16:20:00 +0000"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_date("2009-09-06T18:20:00+02:00"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
        assert_eq!(
            parse_date("2009-09-06T16:20:00.250Z").map(|d| d.timestamp()),
            Some(utc(2009, 9, 6, 16, 20, 0).timestamp())
        );
    }

    #[test]
    fn test_naive_datetimes_are_utc() {
        assert_eq!(
            parse_date("2009-09-06 16:20:00"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
        assert_eq!(
            parse_date("2009-09-06T16:20:00"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_date_only_layouts() {
        let midnight = Some(utc(2009, 9, 6, 0, 0, 0));
        assert_eq!(parse_date("2009-09-06"), midnight);
        assert_eq!(parse_date("2009/09/06"), midnight);
        assert_eq!(parse_date("September 6, 2009"), midnight);
        assert_eq!(parse_date("6 September 2009"), midnight);
    }

    #[test]
    fn test_unix_seconds() {
        assert_eq!(parse_date("1252254000"), Some(utc(2009, 9, 6, 16, 20, 0)));
    }

    #[test]
    fn test_unix_millis() {
        assert_eq!(
            parse_date("1252254000000"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
        assert_eq!(
            parse_date("1252254000250").map(|d| d.timestamp_millis()),
            Some(1_252_254_000_250)
        );
    }

    #[test]
    fn test_other_digit_runs_are_none() {
        assert_eq!(parse_date("12522540000"), None);
        assert_eq!(parse_date("125225400000000"), None);
        assert_eq!(parse_date("99999999999999999999"), None);
    }

    #[test]
    fn test_unix_date_layout() {
        assert_eq!(
            parse_date("Sun Sep  6 16:20:00 UTC 2009"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
        assert_eq!(
            parse_date("Sun Sep 6 16:20:00 GMT 2009"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_rfc2822_with_colon_offset() {
        assert_eq!(
            parse_date("Sun, 06 Sep 2009 16:20:00 +00:00"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
        assert_eq!(
            parse_date("Sun, 06 Sep 2009 18:20:00 +02:00"),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(
            parse_date("\n   Sun, 06 Sep 2009 16:20:00 +0000\n  "),
            Some(utc(2009, 9, 6, 16, 20, 0))
        );
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("yesterday-ish"), None);
        assert_eq!(parse_date("2009-13-45"), None);
    }

    proptest! {
        #[test]
        fn test_never_panics(s in "\\PC*") {
            let _ = parse_date(&s);
        }
    }
}
