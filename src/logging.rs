//! File logging. The terminal belongs to the UI, so nothing is written to
//! stdout or stderr once the app is running.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const LOG_ENV: &str = "AGRILINK_LOG";
const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber. Keep the guard alive until exit or the
/// last buffered lines are lost.
pub fn init(config: &Config) -> Result<WorkerGuard> {
  let dir = config.log_dir();
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "agrilink.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter(config.log.level.as_deref()))
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  tracing::info!(dir = %dir.display(), "logging initialised");
  Ok(guard)
}

/// AGRILINK_LOG wins over the configured level.
fn filter(configured: Option<&str>) -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_LEVEL)))
    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}
