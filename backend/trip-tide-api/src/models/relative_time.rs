//! Human "time ago" rendering for `createdAt` fields
//!
//! The web client displays timestamps exactly as the API returns them, so the
//! wording and rounding thresholds follow the moment.js `fromNow()` output the
//! client was built against: "a few seconds ago", "5 minutes ago",
//! "a day ago", "3 months ago", ...

use chrono::{DateTime, Utc};

const SECONDS_THRESHOLD: f64 = 45.0;
const MINUTES_THRESHOLD: f64 = 45.0;
const HOURS_THRESHOLD: f64 = 22.0;
const DAYS_THRESHOLD: f64 = 26.0;
const MONTHS_THRESHOLD: f64 = 11.0;

/// Render `timestamp` relative to `now`. Future timestamps count as "now".
pub fn from_now(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed_ms = (now - timestamp).num_milliseconds().max(0) as f64;
    let days_exact = elapsed_ms / 86_400_000.0;

    let seconds = (elapsed_ms / 1000.0).round();
    let minutes = (elapsed_ms / 60_000.0).round();
    let hours = (elapsed_ms / 3_600_000.0).round();
    let days = days_exact.round();
    // 400 years hold 146097 days
    let months = (days_exact * 4800.0 / 146_097.0).round();
    let years = (days_exact * 400.0 / 146_097.0).round();

    let phrase = if seconds < SECONDS_THRESHOLD {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < MINUTES_THRESHOLD {
        format!("{} minutes", minutes)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < HOURS_THRESHOLD {
        format!("{} hours", hours)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < DAYS_THRESHOLD {
        format!("{} days", days)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < MONTHS_THRESHOLD {
        format!("{} months", months)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    };

    format!("{} ago", phrase)
}
