//! Publish-date normalization
//!
//! Pages show dates in every shape imaginable ("发布时间：2024年3月5日",
//! "Posted 2024/03/05 10:00", "March 5, 2024"). This routine finds the first
//! date-like token and turns it into a calendar date. It never fails: text
//! it cannot understand yields `None`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static YMD_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})\s*[-/.年]\s*([0-9]{1,2})\s*[-/.月]\s*([0-9]{1,2})").ok()
});

static COMPACT_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{4})([0-9]{2})([0-9]{2})(?:[^0-9]|$)").ok());

/// Loose English date formats without a timezone
const LOOSE_PATTERNS: &[&str] = &[
    "%b %e, %Y", // Jan 5, 2024
    "%e %b %Y",  // 5 Jan 2024
    "%b %d, %Y", // Jan 05, 2024
    "%d %b %Y",  // 05 Jan 2024
    "%B %e, %Y", // January 5, 2024
    "%e %B %Y",  // 5 January 2024
    "%B %d, %Y", // January 05, 2024
    "%d %B %Y",  // 05 January 2024
];

/// Normalizes a raw date string into a calendar date
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sitesift::extract::normalize_date;
///
/// assert_eq!(normalize_date("2024年3月5日 10:00"), NaiveDate::from_ymd_opt(2024, 3, 5));
/// assert_eq!(normalize_date("no date here"), None);
/// ```
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = match_ymd(raw) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for pattern in LOOSE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
            return Some(date);
        }
    }

    if let Ok(dt) = dateparser::parse(raw) {
        return Some(dt.date_naive());
    }

    None
}

/// Converts a Unix timestamp (seconds) into a UTC calendar date
pub fn date_from_timestamp(seconds: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(|dt| dt.date_naive())
}

fn match_ymd(raw: &str) -> Option<NaiveDate> {
    for pattern in [&*YMD_PATTERN, &*COMPACT_PATTERN].into_iter().flatten() {
        let found = pattern.captures_iter(raw).find_map(|caps| {
            let year = caps.get(1)?.as_str().parse().ok()?;
            let month = caps.get(2)?.as_str().parse().ok()?;
            let day = caps.get(3)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}
