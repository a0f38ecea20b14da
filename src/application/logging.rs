//! # Logging
//!
//! Installs the global `tracing` subscriber (a plain-text session file plus stdout) and
//! provides `FeatureLogger`, a small handle features use to tag their log lines.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;

/// Starts a fresh session log and installs the subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. The returned guard must be held
/// for the life of the process or buffered file output is lost.
pub fn init_tracing(config: &LoggingConfig) -> Result<WorkerGuard> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let log_path = directory.join(&config.file);
    if log_path.exists() {
        fs::remove_file(&log_path)
            .with_context(|| format!("Failed to clear previous log {}", log_path.display()))?;
    }

    let file_appender = tracing_appender::rolling::never(directory, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Emits log lines tagged with a feature's name.
#[derive(Debug, Clone)]
pub struct FeatureLogger {
    tag: String,
}

impl FeatureLogger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn info(&self, message: &str) {
        tracing::info!(feature = %self.tag, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(feature = %self.tag, "{}", message);
    }
}
