//! Prompt construction: persona + athlete + recent sessions → (system, user).
//!
//! One builder serves every invocation mode. [`PromptTask`] selects the
//! session heading and instruction block; the surrounding structure is fixed.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::error::CoachError;
use crate::profile::PersonalityProfile;
use crate::recency::days_to_goal;
use crate::training_log::{Athlete, SessionRecord};

/// Rendered in place of the session list when it is empty.
pub const NO_RECENT_SESSIONS: &str = "No recent sessions.";

/// Placeholder for an empty type, heart rate, or RPE field.
const MISSING_FIELD: &str = "?";

/// What the model is being asked to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTask {
    /// Today's session plan.
    Daily {
        /// Trailing window of sessions shown to the model.
        window_days: i64,
    },
    /// Monday–Sunday plan.
    Weekly {
        /// Trailing window of sessions shown to the model.
        window_days: i64,
    },
    /// Ad-hoc question from the chat.
    Question(String),
}

impl PromptTask {
    /// Recency window to apply before prompting, if any.
    pub fn recency_window(&self) -> Option<i64> {
        match self {
            Self::Daily { window_days } | Self::Weekly { window_days } => Some(*window_days),
            Self::Question(_) => None,
        }
    }

    /// Heading line prefixed to the published message, if the task has one.
    pub fn heading(&self, profile: &PersonalityProfile) -> Option<String> {
        match self {
            Self::Weekly { .. } => Some(format!(
                "**\u{1f4c5} {} \u{2014} WEEK PLAN**",
                profile.name.to_uppercase()
            )),
            Self::Daily { .. } | Self::Question(_) => None,
        }
    }

    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily { .. } => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Question(_) => "question",
        }
    }
}

/// System and user instructions for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Persona framing.
    pub system: String,
    /// Athlete context and task.
    pub user: String,
}

/// Persona text shared by every task.
pub fn system_text(profile: &PersonalityProfile) -> String {
    format!(
        "You are {name}, {role}. \
         Background: {background} \
         Tone: {tone} \
         Philosophy: {philosophy}. \
         Rules: {rules}. \
         Style cues: success={success} | failure={failure} | burnout={burnout}. \
         Use vocabulary when fitting: {vocabulary}. \
         Be concise, tactical, and specific. Protect the mission from overtraining.",
        name = profile.name,
        role = profile.role,
        background = profile.background,
        tone = profile.tone,
        philosophy = profile.philosophy.join(", "),
        rules = profile.rules.join(", "),
        success = profile.style.success,
        failure = profile.style.failure,
        burnout = profile.style.burnout,
        vocabulary = profile.vocabulary.join(", "),
    )
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        MISSING_FIELD
    } else {
        value
    }
}

/// One bullet line per session, or [`NO_RECENT_SESSIONS`].
pub fn render_sessions(records: &[SessionRecord]) -> String {
    if records.is_empty() {
        return NO_RECENT_SESSIONS.to_owned();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "- {} | {} | HR {} | RPE {} | Notes: {}",
                r.date,
                or_placeholder(&r.kind),
                or_placeholder(&r.avg_hr),
                or_placeholder(&r.rpe),
                r.notes,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn session_heading(task: &PromptTask) -> String {
    match task {
        PromptTask::Daily { window_days } => format!("Recent sessions ({window_days}d):"),
        PromptTask::Weekly { window_days } => format!("Recent {window_days}-day sessions:"),
        PromptTask::Question(_) => "Logged sessions:".to_owned(),
    }
}

fn task_block(task: &PromptTask, profile: &PersonalityProfile) -> String {
    match task {
        PromptTask::Daily { .. } => format!(
            "Task:\n\
             1) Generate TODAY's training plan (erg and/or lifting) with exact sets, reps, stroke rates, HR targets, and estimated target splits relative to 2k pace when appropriate. Include warm-up and cool-down.\n\
             2) Detect recovery risk from recent HR/RPE. If high, adjust plan (do not glorify overtraining).\n\
             3) Provide a short '{name}' motivation message (1\u{2013}2 lines).\n\
             4) Provide a session quality focus (1\u{2013}2 bullets) that I can repeat during the session.\n\
             Format as chat-friendly markdown with clear headings and bullets.",
            name = profile.name,
        ),
        PromptTask::Weekly { .. } => "Task:\n\
             Design a Monday\u{2013}Sunday weekly plan that progresses toward the 2k goal. Include:\n\
             - Session type each day (erg/threshold/UT2/sprints/weights)\n\
             - Exact prescriptions (duration, rate, HR targets, split targets vs 2k), warm-up/cool-down\n\
             - Adjust for recovery risk based on recent HR/RPE\n\
             - 1\u{2013}2 key focus cues for the week\n\
             - A concrete checkpoint (e.g., 6k, 4x1k) if warranted\n\
             Format as chat-friendly markdown with headings for each day."
            .to_owned(),
        PromptTask::Question(question) => format!(
            "Question: {question}\n\n\
             Task:\n\
             - Answer with clear actions.\n\
             - If relevant, reference {name}'s rowing training structure.\n\
             Format as short chat-friendly markdown.",
            name = profile.name,
        ),
    }
}

/// Build the prompt pair for `task`.
///
/// Pure: the only time input is `reference`, so identical arguments always
/// produce identical text.
///
/// # Errors
///
/// Returns [`CoachError::Parse`] if the athlete's goal date cannot be parsed.
pub fn build_prompt(
    profile: &PersonalityProfile,
    athlete: &Athlete,
    recent: &[SessionRecord],
    task: &PromptTask,
    reference: NaiveDate,
) -> Result<Prompt, CoachError> {
    let days_left = days_to_goal(&athlete.goal_date, reference)?;

    let mut user = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(user, "Athlete: {}", athlete.name);
    let _ = writeln!(
        user,
        "Goal: Sub-{} 2k on {} (days left: {days_left})",
        athlete.goal_2k_time, athlete.goal_date
    );
    let _ = writeln!(
        user,
        "Stats: weight={} lb, VO2max={}, age={}",
        athlete.weight_lb, athlete.vo2max, athlete.age
    );
    user.push('\n');
    user.push_str(&session_heading(task));
    user.push('\n');
    user.push_str(&render_sessions(recent));
    user.push_str("\n\n");
    user.push_str(&task_block(task, profile));
    user.push('\n');

    Ok(Prompt {
        system: system_text(profile),
        user,
    })
}
