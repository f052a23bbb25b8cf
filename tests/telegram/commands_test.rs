//! Slash command parsing, the coaching-chat guard, and command handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use coach_quinn::coach::Coach;
use coach_quinn::error::CoachError;
use coach_quinn::sheets::SheetStore;
use coach_quinn::telegram::commands::{
    channel_allowed, execute, handle_help, parse_command, parse_log_args, redirect_notice,
    BotCommand, BotState, Reply,
};

use crate::support::{profile, temp_json, MemorySheet, ScriptedProvider, LOG_JSON};

const QA_CHAT: i64 = -100_123;
const OTHER_CHAT: i64 = -100_999;

struct Fixture {
    state: BotState,
    provider: Arc<ScriptedProvider>,
    sheet: Arc<MemorySheet>,
    _log: tempfile::NamedTempFile,
}

fn fixture(with_sheet: bool) -> Fixture {
    let log = temp_json(LOG_JSON);
    let provider = ScriptedProvider::new("  Keep the rate at 20.  ");
    let sheet = MemorySheet::with_rows(&[]);
    let store: Option<Arc<dyn SheetStore>> = if with_sheet {
        Some(sheet.clone())
    } else {
        None
    };
    let coach = Coach::new(
        Arc::new(profile()),
        log.path().to_path_buf(),
        provider.clone(),
    );
    Fixture {
        state: BotState {
            coach,
            sheet: store,
            qa_chat_id: QA_CHAT,
            timezone: chrono_tz::America::New_York,
        },
        provider,
        sheet,
        _log: log,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 24).expect("valid date")
}

#[test]
fn parse_command_recognises_slash_commands() {
    assert_eq!(parse_command("/help"), Some(BotCommand::Help));
    assert_eq!(parse_command("/start"), Some(BotCommand::Help));
    assert_eq!(
        parse_command("/ask  how long should I rest? "),
        Some(BotCommand::Ask("how long should I rest?".to_owned()))
    );
    assert_eq!(
        parse_command("/log@coach_bot erg | 5k"),
        Some(BotCommand::Log("erg | 5k".to_owned()))
    );
    assert_eq!(parse_command("/ask"), Some(BotCommand::Ask(String::new())));
    assert_eq!(
        parse_command("/weather"),
        Some(BotCommand::Unknown("weather".to_owned()))
    );
    assert_eq!(parse_command("just chatting"), None);
}

#[test]
fn log_args_fill_missing_trailing_fields() {
    let record = parse_log_args("erg | 6x500m | 165", "2025-05-24").expect("valid args");
    assert_eq!(record.date, "2025-05-24");
    assert_eq!(record.kind, "erg");
    assert_eq!(record.details, "6x500m");
    assert_eq!(record.avg_hr, "165");
    assert_eq!(record.avg_split, "");
    assert_eq!(record.notes, "");
}

#[test]
fn log_args_accept_all_seven_fields() {
    let record = parse_log_args("erg | 2k test | 178 | 1:41.2 | 2000 | 10 | PB!", "2025-05-24")
        .expect("valid args");
    assert_eq!(record.avg_split, "1:41.2");
    assert_eq!(record.meters, "2000");
    assert_eq!(record.rpe, "10");
    assert_eq!(record.notes, "PB!");
}

#[test]
fn log_args_require_type_and_details() {
    for args in ["", "erg", "erg |", " | 5k", "a|b|c|d|e|f|g|h"] {
        let err = parse_log_args(args, "2025-05-24").expect_err("should be rejected");
        assert!(err.starts_with("Usage: /log"), "args {args:?}");
    }
}

#[test]
fn only_the_coaching_chat_is_allowed() {
    assert!(channel_allowed(QA_CHAT, QA_CHAT));
    assert!(!channel_allowed(OTHER_CHAT, QA_CHAT));
}

#[test]
fn redirect_notice_names_the_coach() {
    assert_eq!(
        redirect_notice(&profile()),
        "Use the coaching chat for Coach Quinn commands."
    );
}

#[test]
fn help_lists_both_commands() {
    let help = handle_help();
    assert!(help.contains("/ask"));
    assert!(help.contains("/log"));
}

#[test]
fn help_asks_for_a_private_chat() {
    assert!(handle_help().contains("Start a private chat with me"));
}

#[tokio::test]
async fn commands_outside_the_coaching_chat_are_redirected_privately() {
    let fx = fixture(true);

    for command in [
        BotCommand::Ask("should I row today?".to_owned()),
        BotCommand::Log("erg | 5k".to_owned()),
    ] {
        let reply = execute(command, OTHER_CHAT, &fx.state, today())
            .await
            .expect("redirect is not an error");
        assert_eq!(
            reply,
            Some(Reply::Private(
                "Use the coaching chat for Coach Quinn commands.".to_owned()
            ))
        );
    }

    assert!(fx.provider.requests().is_empty());
    assert!(fx.sheet.rows().is_empty());
}

#[tokio::test]
async fn ask_returns_trimmed_answer() {
    let fx = fixture(false);
    let reply = execute(
        BotCommand::Ask("How do I pace a 6k?".to_owned()),
        QA_CHAT,
        &fx.state,
        today(),
    )
    .await
    .expect("ask should succeed");

    assert_eq!(reply, Some(Reply::Answer("Keep the rate at 20.".to_owned())));
    let requests = fx.provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user.contains("Question: How do I pace a 6k?"));
}

#[tokio::test]
async fn empty_ask_shows_usage_without_calling_the_model() {
    let fx = fixture(false);
    let reply = execute(BotCommand::Ask(String::new()), QA_CHAT, &fx.state, today())
        .await
        .expect("usage is not an error");

    assert!(matches!(reply, Some(Reply::Notice(text)) if text.starts_with("Usage: /ask")));
    assert!(fx.provider.requests().is_empty());
}

#[tokio::test]
async fn log_appends_headers_and_dated_row() {
    let fx = fixture(true);
    let reply = execute(
        BotCommand::Log("erg | 3x10min | 152 | | | 7 | windy".to_owned()),
        QA_CHAT,
        &fx.state,
        today(),
    )
    .await
    .expect("log should succeed");

    assert_eq!(
        reply,
        Some(Reply::Notice("Logged: <b>erg</b> \u{2013} 3x10min".to_owned()))
    );
    let rows = fx.sheet.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Date");
    assert_eq!(
        rows[1],
        vec!["2025-05-24", "erg", "3x10min", "152", "", "", "7", "windy"]
    );
}

#[tokio::test]
async fn malformed_log_shows_usage_and_appends_nothing() {
    let fx = fixture(true);
    let reply = execute(BotCommand::Log("erg".to_owned()), QA_CHAT, &fx.state, today())
        .await
        .expect("usage is not an error");

    assert!(matches!(reply, Some(Reply::Notice(text)) if text.starts_with("Usage: /log")));
    assert!(fx.sheet.rows().is_empty());
}

#[tokio::test]
async fn log_without_sheet_is_a_configuration_error() {
    let fx = fixture(false);
    let result = execute(
        BotCommand::Log("erg | 5k".to_owned()),
        QA_CHAT,
        &fx.state,
        today(),
    )
    .await;
    assert!(matches!(result, Err(CoachError::Configuration(_))));
}

#[tokio::test]
async fn unknown_commands_get_no_reply() {
    let fx = fixture(false);
    let reply = execute(
        BotCommand::Unknown("weather".to_owned()),
        OTHER_CHAT,
        &fx.state,
        today(),
    )
    .await
    .expect("unknown is not an error");
    assert_eq!(reply, None);
}

#[tokio::test]
async fn help_is_answered_in_any_chat() {
    let fx = fixture(false);
    let reply = execute(BotCommand::Help, OTHER_CHAT, &fx.state, today())
        .await
        .expect("help is not an error");
    assert_eq!(reply, Some(Reply::Notice(handle_help())));
}
