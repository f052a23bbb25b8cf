//! Prompt text layout and determinism.

use chrono::NaiveDate;

use coach_quinn::error::CoachError;
use coach_quinn::prompt::{
    build_prompt, render_sessions, system_text, PromptTask, NO_RECENT_SESSIONS,
};
use coach_quinn::training_log::{SessionRecord, TrainingLog};

use crate::support::{profile, LOG_JSON};

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 24).expect("valid date")
}

fn log() -> TrainingLog {
    TrainingLog::from_json(LOG_JSON).expect("fixture log should parse")
}

fn daily() -> PromptTask {
    PromptTask::Daily { window_days: 7 }
}

#[test]
fn empty_session_list_renders_placeholder() {
    assert_eq!(render_sessions(&[]), NO_RECENT_SESSIONS);

    let log = log();
    let prompt = build_prompt(&profile(), &log.athlete, &[], &daily(), reference())
        .expect("prompt should build");
    assert!(prompt
        .user
        .contains("Recent sessions (7d):\nNo recent sessions.\n\nTask:"));
}

#[test]
fn user_text_carries_athlete_goal_and_sessions() {
    let log = log();
    let recent = vec![log.sessions[1].clone()];
    let prompt = build_prompt(&profile(), &log.athlete, &recent, &daily(), reference())
        .expect("prompt should build");

    assert!(prompt.user.starts_with(
        "Athlete: Sam\n\
         Goal: Sub-6:30 2k on 2025-12-01 (days left: 191)\n\
         Stats: weight=185 lb, VO2max=55.5, age=29\n\n"
    ));
    assert!(prompt
        .user
        .contains("- 2025-05-20 | erg | HR 150 | RPE 7 | Notes: steady"));
    assert!(!prompt.user.contains("Notes: old"));
    assert!(prompt.user.contains("'Coach Quinn' motivation"));
    assert!(prompt.user.ends_with('\n'));
}

#[test]
fn empty_fields_render_as_question_marks() {
    let record = SessionRecord {
        date: "2025-05-21".to_owned(),
        ..SessionRecord::default()
    };
    assert_eq!(
        render_sessions(&[record]),
        "- 2025-05-21 | ? | HR ? | RPE ? | Notes: "
    );
}

#[test]
fn sessions_render_one_line_each_in_order() {
    let log = log();
    let rendered = render_sessions(&log.sessions);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("- 2025-05-01"));
    assert!(lines[1].starts_with("- 2025-05-20"));
}

#[test]
fn identical_inputs_give_identical_prompts() {
    let log = log();
    let first = build_prompt(&profile(), &log.athlete, &log.sessions, &daily(), reference())
        .expect("prompt should build");
    let second = build_prompt(&profile(), &log.athlete, &log.sessions, &daily(), reference())
        .expect("prompt should build");
    assert_eq!(first, second);
}

#[test]
fn system_text_lists_persona_fields() {
    let text = system_text(&profile());
    assert!(text.starts_with("You are Coach Quinn, a rowing coach."));
    assert!(text.contains("Philosophy: consistency, aerobic base."));
    assert!(text.contains("Rules: no junk miles, sleep first."));
    assert!(text.contains("success=Bank it. | failure=Reset and row. | burnout=Step back."));
    assert!(text.contains("Use vocabulary when fitting: catch, drive."));
    assert!(text.ends_with("Protect the mission from overtraining."));
}

#[test]
fn past_goal_shows_negative_days() {
    let log = log();
    let after = NaiveDate::from_ymd_opt(2025, 12, 5).expect("valid date");
    let prompt =
        build_prompt(&profile(), &log.athlete, &[], &daily(), after).expect("prompt should build");
    assert!(prompt.user.contains("(days left: -4)"));
}

#[test]
fn weekly_task_uses_its_own_heading_and_block() {
    let log = log();
    let task = PromptTask::Weekly { window_days: 14 };
    let prompt = build_prompt(&profile(), &log.athlete, &log.sessions, &task, reference())
        .expect("prompt should build");
    assert!(prompt.user.contains("Recent 14-day sessions:\n"));
    assert!(prompt.user.contains("Monday\u{2013}Sunday weekly plan"));
    assert!(prompt.user.contains("headings for each day"));
}

#[test]
fn question_task_embeds_the_question() {
    let log = log();
    let task = PromptTask::Question("How do I pace a 6k?".to_owned());
    let prompt = build_prompt(&profile(), &log.athlete, &log.sessions, &task, reference())
        .expect("prompt should build");
    assert!(prompt.user.contains("Logged sessions:\n"));
    assert!(prompt.user.contains("Question: How do I pace a 6k?\n\nTask:"));
    assert!(prompt
        .user
        .contains("reference Coach Quinn's rowing training structure"));
}

#[test]
fn only_weekly_has_a_heading() {
    let profile = profile();
    assert_eq!(
        PromptTask::Weekly { window_days: 14 }.heading(&profile).as_deref(),
        Some("**\u{1f4c5} COACH QUINN \u{2014} WEEK PLAN**")
    );
    assert_eq!(daily().heading(&profile), None);
    assert_eq!(PromptTask::Question("x".to_owned()).heading(&profile), None);
}

#[test]
fn question_task_has_no_recency_window() {
    assert_eq!(daily().recency_window(), Some(7));
    assert_eq!(PromptTask::Question("x".to_owned()).recency_window(), None);
}

#[test]
fn malformed_goal_date_fails_the_build() {
    let mut athlete = log().athlete;
    athlete.goal_date = "next spring".to_owned();
    let result = build_prompt(&profile(), &athlete, &[], &daily(), reference());
    assert!(matches!(result, Err(CoachError::Parse(_))));
}
