// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Parse an upstream ISO-8601 timestamp.
///
/// A trailing `Z` is rewritten to `+00:00` before RFC 3339 parsing.  A naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` is taken as UTC.  Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// RSS `pubDate` (RFC 2822), falling back to [`parse_timestamp`].
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_timestamp(raw))
}

/// `true` iff `ts` is strictly after `now - window_days`.
pub fn is_recent(ts: DateTime<Utc>, now: DateTime<Utc>, window_days: i64) -> bool {
    ts > now - Duration::days(window_days)
}
