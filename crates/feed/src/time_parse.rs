// ABOUTME: Publication date parsing for RSS/Atom feeds into Unix timestamps.
// ABOUTME: Tries RFC 2822 first, then RFC 3339, named timezones, and a truncated ISO-8601 form.

use chrono::format::ParseErrorKind;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Z|([+-])([0-9]{2}):([0-9]{2}))$").unwrap());

/// Parses a publication date into a Unix timestamp.
///
/// Returns 0 for empty or unparseable input, and for dates chrono cannot
/// represent. Timestamps without any zone information are read as UTC.
pub fn parse_pubdate(text: &str) -> i64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    match parse_rfc2822(text) {
        Ok(timestamp) => return timestamp,
        Err(ParseErrorKind::OutOfRange) => {
            tracing::warn!(date = %text, "pubdate is outside the representable range");
            return 0;
        }
        Err(_) => {}
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.timestamp();
    }

    if let Some(dt) = parse_with_named_timezone(text) {
        return dt.timestamp();
    }

    // Lenient variants with a numeric offset
    let formats_with_tz = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%a, %e %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S %z",
        "%e %b %Y %H:%M:%S %z",
        "%a, %d %b %Y %H:%M %z",
    ];
    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return dt.timestamp();
        }
    }

    if let Some(timestamp) = parse_iso_prefix(text) {
        return timestamp;
    }

    let formats_naive = [
        "%a, %d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Utc.from_utc_datetime(&naive).timestamp();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Utc.from_utc_datetime(&naive).timestamp();
        }
    }

    tracing::warn!(date = %text, "cannot parse date");
    0
}

/// RFC 2822, retried without the weekday since feeds often get it wrong.
fn parse_rfc2822(text: &str) -> Result<i64, ParseErrorKind> {
    match DateTime::parse_from_rfc2822(text) {
        Ok(dt) => Ok(dt.timestamp()),
        Err(err) => {
            if let Some((_, rest)) = text.split_once(',') {
                if let Ok(dt) = DateTime::parse_from_rfc2822(rest.trim()) {
                    return Ok(dt.timestamp());
                }
            }
            Err(err.kind())
        }
    }
}

/// Reads `YYYY-MM-DDTHH:MM:SS` from the first 19 characters and applies a
/// trailing `Z` or `±HH:MM` offset when the remainder is exactly that.
fn parse_iso_prefix(text: &str) -> Option<i64> {
    let split = text
        .char_indices()
        .nth(19)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let (head, rest) = text.split_at(split);
    let naive = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S").ok()?;
    let local = Utc.from_utc_datetime(&naive).timestamp();

    let offset = match ISO_OFFSET.captures(rest) {
        Some(caps) => match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(sign), Some(hours), Some(minutes)) => {
                let hours: i64 = hours.as_str().parse().ok()?;
                let minutes: i64 = minutes.as_str().parse().ok()?;
                let offset = hours * 3600 + minutes * 60;
                if sign.as_str() == "-" {
                    -offset
                } else {
                    offset
                }
            }
            _ => 0,
        },
        None => 0,
    };

    Some(local - offset)
}

/// Parses datetime strings ending in a named timezone chrono does not know.
fn parse_with_named_timezone(s: &str) -> Option<DateTime<FixedOffset>> {
    let tz_offsets: &[(&str, i32)] = &[
        ("AKST", -9 * 3600),
        ("AKDT", -8 * 3600),
        ("HST", -10 * 3600),
        ("AST", -4 * 3600),
        ("ADT", -3 * 3600),
        ("NST", -(3 * 3600 + 30 * 60)),
        ("NDT", -(2 * 3600 + 30 * 60)),
        ("WEST", 3600),
        ("WET", 0),
        ("CEST", 2 * 3600),
        ("CET", 3600),
        ("EEST", 3 * 3600),
        ("EET", 2 * 3600),
        ("BST", 3600),
        ("JST", 9 * 3600),
        ("KST", 9 * 3600),
        ("AEST", 10 * 3600),
        ("AEDT", 11 * 3600),
        ("AWST", 8 * 3600),
        ("NZST", 12 * 3600),
        ("NZDT", 13 * 3600),
    ];

    let formats = [
        "%a, %d %b %Y %H:%M:%S",
        "%a, %e %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%e %b %Y %H:%M:%S",
    ];

    for (tz_name, offset_secs) in tz_offsets {
        let Some(base) = s.strip_suffix(tz_name) else {
            continue;
        };
        let base = base.trim_end();
        for fmt in &formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(base, fmt) {
                let offset = FixedOffset::east_opt(*offset_secs)?;
                return offset.from_local_datetime(&naive).single();
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc2822() {
        assert_eq!(parse_pubdate("Fri, 21 Nov 1997 09:55:06 -0600"), 880127706);
    }

    #[test]
    fn test_before_epoch() {
        assert_eq!(parse_pubdate("Mon, 02 May 1960 09:05:01 +0100"), -305049299);
    }

    #[test]
    fn test_wrong_weekday_still_parses() {
        // 21 Nov 1997 was a Friday
        assert_eq!(parse_pubdate("Mon, 21 Nov 1997 09:55:06 -0600"), 880127706);
    }

    #[test]
    fn test_iso_with_offset() {
        assert_eq!(parse_pubdate("2003-12-13T00:00:00+02:00"), 1071266400);
        assert_eq!(parse_pubdate("2003-12-13T18:30:02Z"), 1071340202);
    }

    #[test]
    fn test_iso_prefix_with_trailing_garbage_reads_as_utc() {
        assert_eq!(parse_pubdate("2003-12-13T18:30:02 (local)"), 1071340202);
    }

    #[test]
    fn test_named_timezone() {
        // 10:00 CET is 09:00 UTC
        assert_eq!(
            parse_pubdate("Wed, 03 Jan 2024 10:00:00 CET"),
            parse_pubdate("Wed, 03 Jan 2024 09:00:00 +0000")
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_pubdate(""), 0);
        assert_eq!(parse_pubdate("unknown"), 0);
    }
}
