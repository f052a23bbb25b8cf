//! Slash command parsing and handling.
//!
//! Handlers return a [`Reply`] describing what to send and where; the
//! dispatcher in [`super`] does the actual sending. `/ask` and `/log` are
//! only honoured in the configured coaching chat.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::coach::Coach;
use crate::error::CoachError;
use crate::profile::PersonalityProfile;
use crate::prompt::PromptTask;
use crate::sheets::{append_session, SheetStore};
use crate::telegram::ui::{ask_usage, escape_html, format_logged, log_usage};
use crate::training_log::SessionRecord;

/// Number of pipe-separated fields `/log` accepts.
const LOG_FIELD_COUNT: usize = 7;

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/help` or `/start`.
    Help,
    /// `/ask <question>`.
    Ask(String),
    /// `/log <fields>`, raw argument text.
    Log(String),
    /// Any other slash command.
    Unknown(String),
}

/// What to send in response to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Generated coaching text for the invoking chat (plain text, truncated on send).
    Answer(String),
    /// HTML notice for the invoking chat.
    Notice(String),
    /// Notice delivered privately to the requesting user only.
    Private(String),
}

/// Dependencies shared by every command invocation.
#[derive(Clone)]
pub struct BotState {
    /// Coaching chain used by `/ask`.
    pub coach: Coach,
    /// Spreadsheet used by `/log`, when configured.
    pub sheet: Option<Arc<dyn SheetStore>>,
    /// The only chat where `/ask` and `/log` run.
    pub qa_chat_id: i64,
    /// Zone for "today".
    pub timezone: Tz,
}

/// Parse a message into a command; `None` if it is not a slash command.
///
/// Bot-mention suffixes (`/ask@coach_bot`) are stripped.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let without_slash = text.trim_start().strip_prefix('/')?;
    let (full_command, args) = match without_slash.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (without_slash, ""),
    };
    let command = full_command.split('@').next().unwrap_or(full_command);

    Some(match command {
        "help" | "start" => BotCommand::Help,
        "ask" => BotCommand::Ask(args.to_owned()),
        "log" => BotCommand::Log(args.to_owned()),
        other => BotCommand::Unknown(other.to_owned()),
    })
}

/// Parse `/log` arguments into a record dated `date`.
///
/// Format: `type | details | [avg_hr] | [avg_split] | [meters] | [rpe] | [notes]`.
/// Omitted trailing fields are empty strings.
///
/// # Errors
///
/// Returns a usage message when type or details is missing or there are too many fields.
pub fn parse_log_args(args: &str, date: &str) -> Result<SessionRecord, String> {
    let fields: Vec<&str> = args.split('|').map(str::trim).collect();
    if fields.len() > LOG_FIELD_COUNT {
        return Err(log_usage());
    }
    let field = |idx: usize| fields.get(idx).copied().unwrap_or_default().to_owned();

    let record = SessionRecord {
        date: date.to_owned(),
        kind: field(0),
        details: field(1),
        avg_hr: field(2),
        avg_split: field(3),
        meters: field(4),
        rpe: field(5),
        notes: field(6),
    };
    if record.kind.is_empty() || record.details.is_empty() {
        return Err(log_usage());
    }
    Ok(record)
}

/// Whether a command from `chat_id` may run.
pub fn channel_allowed(chat_id: i64, qa_chat_id: i64) -> bool {
    chat_id == qa_chat_id
}

/// Private notice sent when a command is used outside the coaching chat.
pub fn redirect_notice(profile: &PersonalityProfile) -> String {
    format!(
        "Use the coaching chat for {} commands.",
        escape_html(&profile.name)
    )
}

/// List available commands.
pub fn handle_help() -> String {
    [
        "<b>Available commands:</b>",
        "",
        "/ask &lt;question&gt; \u{2014} ask the coach about training, recovery, mindset",
        "/log &lt;type&gt; | &lt;details&gt; | [avg_hr] | [avg_split] | [meters] | [rpe] | [notes] \u{2014} log a workout",
        "/help \u{2014} show this message",
        "",
        "<i>Start a private chat with me so notices meant only for you can reach you.</i>",
    ]
    .join("\n")
}

/// Run a command from `chat_id` as of `today`.
///
/// Returns `None` when nothing should be sent.
///
/// # Errors
///
/// Returns [`CoachError`] when the completion, log read, or spreadsheet
/// append fails, or spreadsheet logging is not configured.
pub async fn execute(
    command: BotCommand,
    chat_id: i64,
    state: &BotState,
    today: NaiveDate,
) -> Result<Option<Reply>, CoachError> {
    match command {
        BotCommand::Help => Ok(Some(Reply::Notice(handle_help()))),
        BotCommand::Unknown(name) => {
            debug!(command = %name, "ignoring unknown command");
            Ok(None)
        }
        BotCommand::Ask(_) | BotCommand::Log(_) if !channel_allowed(chat_id, state.qa_chat_id) => {
            warn!(chat_id, "command used outside the coaching chat");
            Ok(Some(Reply::Private(redirect_notice(state.coach.profile()))))
        }
        BotCommand::Ask(question) => handle_ask(state, question, today).await.map(Some),
        BotCommand::Log(args) => handle_log(state, &args, today).await.map(Some),
    }
}

async fn handle_ask(
    state: &BotState,
    question: String,
    today: NaiveDate,
) -> Result<Reply, CoachError> {
    if question.is_empty() {
        return Ok(Reply::Notice(ask_usage()));
    }
    let answer = state
        .coach
        .generate(&PromptTask::Question(question), today)
        .await?;
    Ok(Reply::Answer(answer))
}

async fn handle_log(state: &BotState, args: &str, today: NaiveDate) -> Result<Reply, CoachError> {
    let date = today.format("%Y-%m-%d").to_string();
    let record = match parse_log_args(args, &date) {
        Ok(record) => record,
        Err(usage) => return Ok(Reply::Notice(usage)),
    };

    let store = state.sheet.as_ref().ok_or_else(|| {
        CoachError::Configuration("spreadsheet logging is not configured".to_owned())
    })?;
    append_session(store.as_ref(), &record).await?;
    info!(date = %record.date, kind = %record.kind, "session logged from chat");
    Ok(Reply::Notice(format_logged(&record)))
}
