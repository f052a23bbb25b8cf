//! Date parsing, recency window, and goal countdown.

use chrono::NaiveDate;

use coach_quinn::error::CoachError;
use coach_quinn::recency::{days_to_goal, parse_session_date, select_recent, today_in};
use coach_quinn::training_log::SessionRecord;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn session(date: &str, notes: &str) -> SessionRecord {
    SessionRecord {
        date: date.to_owned(),
        notes: notes.to_owned(),
        ..SessionRecord::default()
    }
}

#[test]
fn parses_common_date_formats() {
    let expected = Some(date(2025, 5, 20));
    for text in [
        "2025-05-20",
        "2025/05/20",
        "05/20/2025",
        "5/20/25",
        "05-20-2025",
        "May 20, 2025",
        "May 20 2025",
        "Tue, May 20, 2025",
        "20 May 2025",
        "20 May 2025",
        "2025-05-20T07:30:00Z",
        "2025-05-20T07:30:00",
        "2025-05-20 07:30",
        "  2025-05-20  ",
    ] {
        assert_eq!(parse_session_date(text), expected, "input {text:?}");
    }
}

#[test]
fn unparsable_dates_are_none() {
    for text in ["", "   ", "yesterday", "2025-13-01", "20/05/2025"] {
        assert_eq!(parse_session_date(text), None, "input {text:?}");
    }
}

#[test]
fn window_boundary_is_inclusive() {
    let records = vec![
        session("2025-05-16", "eight days"),
        session("2025-05-17", "seven days"),
        session("2025-05-24", "today"),
    ];
    let kept = select_recent(&records, 7, date(2025, 5, 24));
    let notes: Vec<&str> = kept.iter().map(|r| r.notes.as_str()).collect();
    assert_eq!(notes, vec!["seven days", "today"]);
}

#[test]
fn future_dated_records_pass_the_filter() {
    let records = vec![session("2025-06-30", "planned")];
    let kept = select_recent(&records, 7, date(2025, 5, 24));
    assert_eq!(kept.len(), 1);
}

#[test]
fn unparsable_records_are_dropped_and_order_is_kept() {
    let records = vec![
        session("May 22, 2025", "first"),
        session("not a date", "junk"),
        session("", "blank"),
        session("2025-05-20", "second"),
        session("2025-05-23", "third"),
    ];
    let kept = select_recent(&records, 7, date(2025, 5, 24));
    let notes: Vec<&str> = kept.iter().map(|r| r.notes.as_str()).collect();
    assert_eq!(notes, vec!["first", "second", "third"]);
}

#[test]
fn duplicate_dates_are_all_kept() {
    let records = vec![session("2025-05-23", "am"), session("2025-05-23", "pm")];
    assert_eq!(select_recent(&records, 7, date(2025, 5, 24)).len(), 2);
}

#[test]
fn empty_input_gives_empty_output() {
    for window in [0, 7, 365] {
        assert!(select_recent(&[], window, date(2025, 5, 24)).is_empty());
    }
}

#[test]
fn days_to_goal_counts_forward() {
    let days = days_to_goal("2025-06-01", date(2025, 5, 25)).expect("goal should parse");
    assert_eq!(days, 7);
}

#[test]
fn days_to_goal_goes_negative_after_goal() {
    let days = days_to_goal("2025-06-01", date(2025, 6, 5)).expect("goal should parse");
    assert_eq!(days, -4);
}

#[test]
fn malformed_goal_date_is_a_parse_error() {
    let result = days_to_goal("sometime in June", date(2025, 5, 25));
    assert!(matches!(result, Err(CoachError::Parse(_))));
}

#[test]
fn today_depends_on_time_zone() {
    // UTC+14 and UTC-11 are always on different calendar days.
    let ahead = today_in(chrono_tz::Pacific::Kiritimati);
    let behind = today_in(chrono_tz::Pacific::Pago_Pago);
    let gap = ahead.signed_duration_since(behind).num_days();
    assert!((1..=2).contains(&gap), "gap was {gap}");
}
