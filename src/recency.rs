//! Date handling: flexible parsing, zoned "today", recency window, goal countdown.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::CoachError;
use crate::training_log::SessionRecord;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    // Two-digit year first: %Y would read "25" as year 25.
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a session date written in any of the common textual forms.
///
/// Returns `None` for empty or unrecognised input; callers treat that as
/// "no date", not as an error.
pub fn parse_session_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Today's calendar date in the given time zone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Keep records whose age relative to `reference` is at most `window_days`.
///
/// Order is preserved. Unparsable dates are dropped. Future-dated records
/// have a non-positive age and therefore always pass.
pub fn select_recent(
    records: &[SessionRecord],
    window_days: i64,
    reference: NaiveDate,
) -> Vec<SessionRecord> {
    records
        .iter()
        .filter(|record| {
            parse_session_date(&record.date)
                .is_some_and(|date| days_between(date, reference) <= window_days)
        })
        .cloned()
        .collect()
}

/// Days remaining until the goal date; negative once the goal has passed.
///
/// # Errors
///
/// Returns [`CoachError::Parse`] if `goal_date` is not a recognisable date.
pub fn days_to_goal(goal_date: &str, reference: NaiveDate) -> Result<i64, CoachError> {
    let goal = parse_session_date(goal_date)
        .ok_or_else(|| CoachError::Parse(format!("goal_date is not a date: {goal_date:?}")))?;
    Ok(days_between(reference, goal))
}
