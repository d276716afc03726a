// Small pure helpers: human time strings, calendar-day checks, and free-text
// validation. No I/O, no state.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;
// No leap years: a year is always 365 days here.
const YEAR_MS: u64 = 365 * DAY_MS;

/// Longest description accepted by `is_valid_description`.
pub const MAX_DESCRIPTION_LEN: usize = 150;

fn time_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)([smhdy])").expect("time token regex is valid"))
}

fn description_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^[a-zA-Z0-9 !#?+\-_:"'{}\[\]%]*$"#).expect("description regex is valid")
    })
}

/// Resolve a human time string like `"1d 4h"` to milliseconds.
///
/// Every `<integer><unit>` token (unit one of `s m h d y`, any case) adds its
/// contribution; everything else is ignored. No tokens resolves to 0.
pub fn resolve_time_string(text: &str) -> u64 {
    time_token_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            // Digits are guaranteed, so a failed parse can only be overflow.
            let amount: u64 = caps[1].parse().unwrap_or(u64::MAX);
            let unit = match caps[2].to_ascii_lowercase().as_str() {
                "s" => SECOND_MS,
                "m" => MINUTE_MS,
                "h" => HOUR_MS,
                "d" => DAY_MS,
                "y" => YEAR_MS,
                _ => return None,
            };
            Some(amount.saturating_mul(unit))
        })
        .fold(0u64, |total, ms| total.saturating_add(ms))
}

/// Resolve several time strings as if they were joined with spaces.
pub fn resolve_time(parts: &[&str]) -> u64 {
    resolve_time_string(&parts.join(" "))
}

/// Whether an RFC 3339 timestamp falls on the same UTC calendar day as `now`.
/// Unparseable input is never today.
pub fn is_same_day(timestamp: &str, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc).date_naive() == now.date_naive())
        .unwrap_or(false)
}

pub fn is_today(timestamp: &str) -> bool {
    is_same_day(timestamp, Utc::now())
}

/// Current instant as an ISO-8601 string, e.g. `2024-05-01T12:00:00.000Z`.
pub fn current_date() -> String {
    format_date(Utc::now())
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts at most 150 characters drawn from letters, digits, space and
/// `! # ? + - _ : " ' { } [ ] %`.
pub fn is_valid_description(description: &str) -> bool {
    description.chars().count() <= MAX_DESCRIPTION_LEN && description_regex().is_match(description)
}
