//! Pure date/time helpers for display and overdue computation.
//!
//! Every function takes `now` explicitly so callers control the clock;
//! production call sites pass `Utc::now()`, tests inject fixed instants.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::FollowUp;

/// Placeholder rendered for absent or unparseable dates.
pub const DATE_PLACEHOLDER: &str = "—";

const SECS_PER_DAY: i64 = 86_400;

/// Whole days elapsed since `date` (floor). Absent input counts as 0.
pub fn days_since(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match date {
        Some(d) => (now - d).num_seconds().div_euclid(SECS_PER_DAY),
        None => 0,
    }
}

/// Locale display format `DD/MM/YYYY`; never fails.
pub fn format_display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => DATE_PLACEHOLDER.to_string(),
    }
}

static ISO_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"T(\d{2}):(\d{2})").expect("valid regex"));
static HM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid regex"));
static HMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}").expect("valid regex"));

/// Normalize a backend time string to `HH:mm` for display. The backend
/// is inconsistent: values arrive as `HH:mm`, `HH:mm:ss`, or a full ISO
/// timestamp. Unrecognized input is returned unchanged.
pub fn format_display_time(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if HM.is_match(raw) {
        return raw.to_string();
    }
    if let Some(caps) = ISO_TIME.captures(raw) {
        return format!("{}:{}", &caps[1], &caps[2]);
    }
    if HMS.is_match(raw) {
        return raw[..5].to_string();
    }
    raw.to_string()
}

/// A follow-up is overdue when it is not done and its scheduled date
/// (taken at midnight UTC) is strictly in the past.
pub fn is_overdue(follow_up: &FollowUp, now: DateTime<Utc>) -> bool {
    if follow_up.done {
        return false;
    }
    follow_up.scheduled_on.and_time(NaiveTime::MIN).and_utc() < now
}
