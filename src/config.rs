//! Configuration loading and validation.
//!
//! Two layers, threaded explicitly to every collaborator:
//! - `coach.toml` (or `$COACH_CONFIG_PATH`): file paths, recency windows, time zone
//! - environment variables: credentials and destination identifiers, and
//!   overrides for any file value
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use url::Url;

use crate::error::CoachError;

/// Time zone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Spreadsheet tab used when none is configured.
pub const DEFAULT_SHEET_TAB: &str = "Sheet1";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input document locations.
    pub paths: PathsConfig,
    /// Session windows for scheduled jobs.
    pub recency: RecencyConfig,
    /// IANA time zone name used to compute "today".
    pub timezone: String,
    /// Secrets and identifiers; environment only, never read from the file.
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            recency: RecencyConfig::default(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            credentials: Credentials::default(),
        }
    }
}

/// Where input documents and logs live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Personality profile JSON.
    pub personality: PathBuf,
    /// Workout log JSON.
    pub log: PathBuf,
    /// Directory for rotated bot logs; defaults to `~/.coach-quinn/logs`.
    pub logs_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            personality: PathBuf::from("personality.json"),
            log: PathBuf::from("log.json"),
            logs_dir: None,
        }
    }
}

/// Trailing windows, in days, used by the scheduled jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct RecencyConfig {
    /// Window for the daily plan.
    #[serde(default = "default_daily_window")]
    pub daily_window_days: i64,
    /// Window for the weekly plan.
    #[serde(default = "default_weekly_window")]
    pub weekly_window_days: i64,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            daily_window_days: default_daily_window(),
            weekly_window_days: default_weekly_window(),
        }
    }
}

fn default_daily_window() -> i64 {
    7
}
fn default_weekly_window() -> i64 {
    14
}

/// Credentials and destination identifiers from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    /// `OPENAI_API_KEY`.
    pub openai_api_key: Option<String>,
    /// `TELEGRAM_BOT_TOKEN`.
    pub telegram_bot_token: Option<String>,
    /// `QA_CHAT_ID`, unparsed.
    pub qa_chat_id: Option<String>,
    /// `WEBHOOK_URL`: daily plan destination.
    pub webhook_url: Option<String>,
    /// `WEBHOOK_URL_PLANS`: weekly plan destination.
    pub plans_webhook_url: Option<String>,
    /// `SHEET_ID`.
    pub sheet_id: Option<String>,
    /// `SHEET_TAB`.
    pub sheet_tab: Option<String>,
    /// `GOOGLE_SERVICE_ACCOUNT_JSON`: the key document itself.
    pub service_account_json: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn presence(v: &Option<String>) -> &'static str {
            if v.is_some() {
                "[SET]"
            } else {
                "[UNSET]"
            }
        }
        f.debug_struct("Credentials")
            .field("openai_api_key", &presence(&self.openai_api_key))
            .field("telegram_bot_token", &presence(&self.telegram_bot_token))
            .field("qa_chat_id", &self.qa_chat_id)
            .field("webhook_url", &presence(&self.webhook_url))
            .field("plans_webhook_url", &presence(&self.plans_webhook_url))
            .field("sheet_id", &self.sheet_id)
            .field("sheet_tab", &self.sheet_tab)
            .field("service_account_json", &presence(&self.service_account_json))
            .finish()
    }
}

/// Spreadsheet settings, present only when both id and key are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSettings<'a> {
    /// Spreadsheet id.
    pub sheet_id: &'a str,
    /// Tab name.
    pub tab: &'a str,
    /// Service-account key JSON.
    pub service_account_json: &'a str,
}

/// Which scheduled webhook to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    /// `WEBHOOK_URL`.
    Daily,
    /// `WEBHOOK_URL_PLANS`.
    Plans,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path_with(|key| std::env::var(key).ok());
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file only; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply environment overrides through a resolver (tests pass a closure
    /// instead of mutating the process environment).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = env("TIMEZONE") {
            self.timezone = v;
        }
        if let Some(v) = env("COACH_PERSONALITY_PATH") {
            self.paths.personality = PathBuf::from(v);
        }
        if let Some(v) = env("COACH_LOG_PATH") {
            self.paths.log = PathBuf::from(v);
        }
        if let Some(v) = env("COACH_LOGS_DIR") {
            self.paths.logs_dir = Some(PathBuf::from(v));
        }
        for (var, slot) in [
            ("COACH_DAILY_WINDOW_DAYS", &mut self.recency.daily_window_days),
            ("COACH_WEEKLY_WINDOW_DAYS", &mut self.recency.weekly_window_days),
        ] {
            if let Some(v) = env(var) {
                match v.trim().parse() {
                    Ok(n) => *slot = n,
                    Err(_) => tracing::warn!(var, value = %v, "ignoring invalid env override"),
                }
            }
        }

        let creds = &mut self.credentials;
        creds.openai_api_key = env("OPENAI_API_KEY").or(creds.openai_api_key.take());
        creds.telegram_bot_token = env("TELEGRAM_BOT_TOKEN").or(creds.telegram_bot_token.take());
        creds.qa_chat_id = env("QA_CHAT_ID").or(creds.qa_chat_id.take());
        creds.webhook_url = env("WEBHOOK_URL").or(creds.webhook_url.take());
        creds.plans_webhook_url = env("WEBHOOK_URL_PLANS").or(creds.plans_webhook_url.take());
        creds.sheet_id = env("SHEET_ID").or(creds.sheet_id.take());
        creds.sheet_tab = env("SHEET_TAB").or(creds.sheet_tab.take());
        creds.service_account_json =
            env("GOOGLE_SERVICE_ACCOUNT_JSON").or(creds.service_account_json.take());
    }

    /// The configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Configuration`] for an unknown zone name.
    pub fn timezone(&self) -> Result<Tz, CoachError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| CoachError::Configuration(format!("invalid TIMEZONE {:?}: {e}", self.timezone)))
    }

    /// Completion-service API key.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Configuration`] when `OPENAI_API_KEY` is unset.
    pub fn require_openai_key(&self) -> Result<&str, CoachError> {
        require(&self.credentials.openai_api_key, "OPENAI_API_KEY")
    }

    /// Chat bot token.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Configuration`] when `TELEGRAM_BOT_TOKEN` is unset.
    pub fn require_bot_token(&self) -> Result<&str, CoachError> {
        require(&self.credentials.telegram_bot_token, "TELEGRAM_BOT_TOKEN")
    }

    /// The one chat where bot commands are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Configuration`] when `QA_CHAT_ID` is unset or not an integer.
    pub fn require_qa_chat_id(&self) -> Result<i64, CoachError> {
        let raw = require(&self.credentials.qa_chat_id, "QA_CHAT_ID")?;
        raw.trim()
            .parse()
            .map_err(|_| CoachError::Configuration(format!("QA_CHAT_ID is not a chat id: {raw:?}")))
    }

    /// Webhook URL for a scheduled job, validated as http(s).
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::Configuration`] when the variable is unset or not an http(s) URL.
    pub fn require_webhook_url(&self, kind: WebhookKind) -> Result<&str, CoachError> {
        let (value, var) = match kind {
            WebhookKind::Daily => (&self.credentials.webhook_url, "WEBHOOK_URL"),
            WebhookKind::Plans => (&self.credentials.plans_webhook_url, "WEBHOOK_URL_PLANS"),
        };
        let raw = require(value, var)?;
        let url = Url::parse(raw)
            .map_err(|e| CoachError::Configuration(format!("{var} is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoachError::Configuration(format!(
                "{var} must be an http(s) URL"
            )));
        }
        Ok(raw)
    }

    /// Spreadsheet settings when both `SHEET_ID` and the service account key are set.
    pub fn sheets(&self) -> Option<SheetSettings<'_>> {
        let creds = &self.credentials;
        match (&creds.sheet_id, &creds.service_account_json) {
            (Some(sheet_id), Some(json)) => Some(SheetSettings {
                sheet_id,
                tab: creds.sheet_tab.as_deref().unwrap_or(DEFAULT_SHEET_TAB),
                service_account_json: json,
            }),
            _ => None,
        }
    }

    /// Directory for rotated bot logs.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the home directory is unknown.
    pub fn logs_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.paths.logs_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("logs")),
        }
    }
}

fn require<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str, CoachError> {
    value
        .as_deref()
        .ok_or_else(|| CoachError::Configuration(format!("{var} is not set")))
}

/// Resolve the config file path: `$COACH_CONFIG_PATH`, else `./coach.toml`.
pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env("COACH_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("coach.toml"))
}

/// Resolve the per-user state directory (`~/.coach-quinn/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".coach-quinn"))
}
