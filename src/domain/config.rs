//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for credentials, polling, logging and feature registration.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_forum")]
    pub forum: String,
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Which feature list is active.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

/// Credentials for an already-authorized script app.
#[derive(Debug, Deserialize, Clone)]
pub struct RedditConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            client_id: None,
            client_secret: None,
            refresh_token: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    /// Delay between cycles, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            page_size: default_page_size(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

/// Feature names registered per mode, plus the command names advertised to users.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub development: Vec<String>,
    #[serde(default)]
    pub production: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
}

fn default_forum() -> String {
    "RSGBot".to_string()
}
fn default_user_agent() -> String {
    format!("threadwatch v{}", env!("CARGO_PKG_VERSION"))
}
fn default_interval_ms() -> u64 {
    4000
}
fn default_page_size() -> u32 {
    100
}
fn default_log_directory() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}
fn default_log_filter() -> String {
    "info,reqwest=warn,hyper=warn".to_string()
}

/// Credentials after validation.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl AppConfig {
    /// Reads and parses the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Applies the environment variable overrides (`CLIENT_ID`, `CLIENT_SECRET`,
    /// `REFRESH_TOKEN`, `SUBREDDIT`, `RSGBOT_ENV`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = non_empty("CLIENT_ID") {
            self.reddit.client_id = Some(value);
        }
        if let Some(value) = non_empty("CLIENT_SECRET") {
            self.reddit.client_secret = Some(value);
        }
        if let Some(value) = non_empty("REFRESH_TOKEN") {
            self.reddit.refresh_token = Some(value);
        }
        if let Some(value) = non_empty("SUBREDDIT") {
            self.forum = value;
        }
        if let Some(value) = non_empty("RSGBOT_ENV") {
            self.mode = if value == "production" {
                Mode::Production
            } else {
                Mode::Development
            };
        }
    }

    /// Feature names for the active mode.
    pub fn enabled_features(&self) -> &[String] {
        match self.mode {
            Mode::Development => &self.features.development,
            Mode::Production => &self.features.production,
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let reddit = &self.reddit;
        match (&reddit.client_id, &reddit.client_secret, &reddit.refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(Credentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                refresh_token: refresh_token.clone(),
            }),
            _ => bail!(
                "Missing credentials: set reddit.client_id, reddit.client_secret and reddit.refresh_token \
                 (or CLIENT_ID, CLIENT_SECRET and REFRESH_TOKEN)"
            ),
        }
    }
}
