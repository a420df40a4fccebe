// ABOUTME: Time-of-day parsing for episode durations and chapter offsets.
// ABOUTME: Accepts HH:MM:SS.fff, MM:SS.fff, and SSS.fff with fractional seconds truncated.

use once_cell::sync::Lazy;
use regex::Regex;

static HOURS_MINUTES_SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+):([0-9]{1,2}):([0-9]{1,2})(\.[0-9]+)?$").unwrap());
static MINUTES_SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+):([0-9]{1,2})(\.[0-9]+)?$").unwrap());
static SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)(\.[0-9]+)?$").unwrap());

/// Parses a Normal Play Time string (RFC 2326 section 3.6) into whole seconds.
///
/// Blank input is 0. Unparseable input logs a warning and yields 0.
pub fn parse_time(value: &str) -> i64 {
    let value = value.trim();
    if value.is_empty() {
        return 0;
    }

    let (hours, minutes, seconds) = if let Some(caps) = HOURS_MINUTES_SECONDS.captures(value) {
        (number(&caps[1]), number(&caps[2]), number(&caps[3]))
    } else if let Some(caps) = MINUTES_SECONDS.captures(value) {
        (0, number(&caps[1]), number(&caps[2]))
    } else if let Some(caps) = SECONDS.captures(value) {
        (0, 0, number(&caps[1]))
    } else if let Ok(seconds) = value.parse::<i64>() {
        (0, 0, seconds)
    } else {
        tracing::warn!(value = %value, "could not parse time value");
        return 0;
    };

    hours
        .saturating_mul(60)
        .saturating_add(minutes)
        .saturating_mul(60)
        .saturating_add(seconds)
}

fn number(digits: &str) -> i64 {
    digits.parse().unwrap_or(i64::MAX)
}
