//! coach-quinn CLI entry point.
//!
//! `daily` and `weekly` run one coaching pass and exit (invoked by an
//! external scheduler); `bot` keeps the chat command dispatcher alive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use coach_quinn::coach::{Coach, SessionSource};
use coach_quinn::config::{Config, WebhookKind};
use coach_quinn::profile::PersonalityProfile;
use coach_quinn::prompt::PromptTask;
use coach_quinn::providers::openai::OpenAiProvider;
use coach_quinn::publisher::webhook::WebhookPublisher;
use coach_quinn::recency::today_in;
use coach_quinn::sheets::google::{GoogleSheetsStore, ServiceAccountKey};
use coach_quinn::sheets::SheetStore;
use coach_quinn::telegram::{self, commands::BotState};

/// Rowing coach assistant: training plans and answers from an LLM persona.
#[derive(Parser)]
#[command(name = "coach-quinn", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Generate today's plan and post it to the daily webhook.
    Daily,
    /// Generate a Monday–Sunday plan and post it to the plans webhook.
    Weekly,
    /// Run the chat bot (`/ask`, `/log`) until interrupted.
    Bot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is normal in production; the environment is used as-is.
    let _ = dotenvy::dotenv();

    let config = Config::load().context("failed to load configuration")?;

    match cli.command {
        Command::Daily => {
            coach_quinn::logging::init_cli()?;
            handle_daily(&config).await
        }
        Command::Weekly => {
            coach_quinn::logging::init_cli()?;
            handle_weekly(&config).await
        }
        Command::Bot => {
            let logs_dir = config.logs_dir()?;
            let _logging_guard = coach_quinn::logging::init_production(&logs_dir)?;
            handle_bot(&config).await
        }
    }
}

/// Build the coach for this invocation, reading the profile fresh.
fn build_coach(config: &Config) -> anyhow::Result<Coach> {
    let profile = PersonalityProfile::load(&config.paths.personality).with_context(|| {
        format!(
            "failed to load personality from {}",
            config.paths.personality.display()
        )
    })?;
    let provider = OpenAiProvider::new(config.require_openai_key()?.to_owned());
    Ok(Coach::new(
        Arc::new(profile),
        config.paths.log.clone(),
        Arc::new(provider),
    ))
}

/// Spreadsheet store, when configured.
fn build_sheet_store(config: &Config) -> anyhow::Result<Option<Arc<dyn SheetStore>>> {
    let Some(settings) = config.sheets() else {
        return Ok(None);
    };
    let key = ServiceAccountKey::from_json(settings.service_account_json)
        .context("GOOGLE_SERVICE_ACCOUNT_JSON is invalid")?;
    info!(sheet_id = settings.sheet_id, tab = settings.tab, "spreadsheet store configured");
    Ok(Some(Arc::new(GoogleSheetsStore::new(
        settings.sheet_id.to_owned(),
        settings.tab.to_owned(),
        key,
    ))))
}

/// Daily plan: log file sessions, short window, plain post.
async fn handle_daily(config: &Config) -> anyhow::Result<()> {
    let tz = config.timezone()?;
    let webhook = WebhookPublisher::new(config.require_webhook_url(WebhookKind::Daily)?.to_owned());
    let coach = build_coach(config)?;

    let task = PromptTask::Daily {
        window_days: config.recency.daily_window_days,
    };
    let today = today_in(tz);
    info!(%today, timezone = %tz, "running daily plan");
    coach.run(&task, today, &webhook).await?;
    info!("daily plan posted");
    Ok(())
}

/// Weekly plan: spreadsheet sessions when configured, longer window, headed post.
async fn handle_weekly(config: &Config) -> anyhow::Result<()> {
    let tz = config.timezone()?;
    let plans_url = config.require_webhook_url(WebhookKind::Plans)?.to_owned();
    let mut coach = build_coach(config)?;
    if let Some(store) = build_sheet_store(config)? {
        coach = coach.with_session_source(SessionSource::Sheet(store));
    }

    let task = PromptTask::Weekly {
        window_days: config.recency.weekly_window_days,
    };
    let webhook = WebhookPublisher::new(plans_url).with_heading(task.heading(coach.profile()));
    let today = today_in(tz);
    info!(%today, timezone = %tz, "running weekly plan");
    coach.run(&task, today, &webhook).await?;
    info!("weekly plan posted");
    Ok(())
}

/// Chat bot: profile loaded once, log re-read per command.
async fn handle_bot(config: &Config) -> anyhow::Result<()> {
    let token = config.require_bot_token()?.to_owned();
    let qa_chat_id = config.require_qa_chat_id()?;
    let timezone = config.timezone()?;
    let sheet = build_sheet_store(config)?;

    let mut coach = build_coach(config)?;
    if let Some(store) = &sheet {
        coach = coach.with_session_source(SessionSource::Sheet(Arc::clone(store)));
    }

    info!(profile = %coach.profile().name, "coach bot starting");
    telegram::run_bot(
        &token,
        BotState {
            coach,
            sheet,
            qa_chat_id,
            timezone,
        },
    )
    .await
}
