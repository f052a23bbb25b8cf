//! The coaching chain: log → recency filter → prompt → completion → publish.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::error::CoachError;
use crate::profile::PersonalityProfile;
use crate::prompt::{build_prompt, Prompt, PromptTask};
use crate::providers::{complete_text, LlmProvider};
use crate::publisher::Publisher;
use crate::recency::select_recent;
use crate::sheets::{read_sessions, SheetStore};
use crate::training_log::TrainingLog;

/// Where session records are read from. Athlete metadata always comes from the log file.
#[derive(Clone)]
pub enum SessionSource {
    /// The `sessions` array of the log file.
    LogFile,
    /// Data rows of a spreadsheet tab.
    Sheet(Arc<dyn SheetStore>),
}

impl std::fmt::Debug for SessionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogFile => f.write_str("LogFile"),
            Self::Sheet(_) => f.write_str("Sheet"),
        }
    }
}

/// Everything needed to turn a [`PromptTask`] into coaching text.
///
/// Immutable; the log is re-read on every call so each run sees fresh data.
#[derive(Clone)]
pub struct Coach {
    profile: Arc<PersonalityProfile>,
    log_path: PathBuf,
    sessions: SessionSource,
    provider: Arc<dyn LlmProvider>,
}

impl Coach {
    /// Coach reading sessions from the log file at `log_path`.
    pub fn new(
        profile: Arc<PersonalityProfile>,
        log_path: PathBuf,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            profile,
            log_path,
            sessions: SessionSource::LogFile,
            provider,
        }
    }

    /// Read sessions from `source` instead of the log file.
    #[must_use]
    pub fn with_session_source(mut self, source: SessionSource) -> Self {
        self.sessions = source;
        self
    }

    /// The persona in use.
    pub fn profile(&self) -> &PersonalityProfile {
        &self.profile
    }

    /// Load fresh data and build the prompt for `task` as of `today`.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError`] if the log cannot be read, the session source
    /// fails, or the goal date is malformed.
    pub async fn compose(&self, task: &PromptTask, today: NaiveDate) -> Result<Prompt, CoachError> {
        let log = TrainingLog::load(&self.log_path)?;
        let sessions = match &self.sessions {
            SessionSource::LogFile => log.sessions,
            SessionSource::Sheet(store) => read_sessions(store.as_ref()).await?,
        };
        let total = sessions.len();

        let selected = match task.recency_window() {
            Some(window) => select_recent(&sessions, window, today),
            None => sessions,
        };
        info!(
            task = task.label(),
            source = ?self.sessions,
            total,
            selected = selected.len(),
            "sessions loaded"
        );

        build_prompt(&self.profile, &log.athlete, &selected, task, today)
    }

    /// Compose the prompt and run it through the completion provider.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError`] from [`Coach::compose`] or
    /// [`CoachError::RemoteService`] if the completion fails.
    pub async fn generate(&self, task: &PromptTask, today: NaiveDate) -> Result<String, CoachError> {
        let prompt = self.compose(task, today).await?;
        let text = complete_text(self.provider.as_ref(), &prompt).await?;
        info!(
            task = task.label(),
            model = self.provider.model_id(),
            chars = text.chars().count(),
            "coaching text generated"
        );
        Ok(text)
    }

    /// Generate text for `task` and hand it to `publisher`. One pass, no retry.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError`] from generation or [`CoachError::Delivery`]
    /// if the destination rejects the message.
    pub async fn run(
        &self,
        task: &PromptTask,
        today: NaiveDate,
        publisher: &dyn Publisher,
    ) -> Result<(), CoachError> {
        let text = self.generate(task, today).await?;
        publisher.deliver(&text).await?;
        Ok(())
    }
}
