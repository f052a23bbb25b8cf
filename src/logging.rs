//! Log output for the two process shapes.
//!
//! `daily` and `weekly` run once under a scheduler that captures stderr, so
//! [`init_cli`] writes plain lines there and nothing else. `bot` runs for
//! days; [`init_production`] also keeps JSON records in a dated file under
//! the logs directory. Both read the level from `RUST_LOG`.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name prefix; the appender adds `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "coach-quinn.log";

const DEFAULT_LEVEL: &str = "info";

/// Keeps the background file writer alive; drop it to flush.
pub struct LoggingGuard {
    _file_writer: WorkerGuard,
}

fn level_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Bot logging: JSON to `{logs_dir}/coach-quinn.log.YYYY-MM-DD` plus stderr.
///
/// # Errors
///
/// Returns an error if `logs_dir` cannot be created or a global subscriber
/// is already installed.
pub fn init_production(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("failed to create logs directory {}", logs_dir.display()))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(level_filter())
        .with(tracing_subscriber::fmt::layer().json().with_writer(file_writer))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("logging already initialised")?;

    Ok(LoggingGuard {
        _file_writer: guard,
    })
}

/// Scheduled-job logging: stderr only.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_cli() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(level_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialised: {e}"))
}
