//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration, Types and Traits
//! - Infrastructure: Reddit API client
//! - Application: Polling loop, Dispatcher, Parser, Logging
//! - Interface: Features
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;

use crate::application::logging::init_tracing;
use crate::application::poller::{PollSettings, Poller};
use crate::domain::config::{AppConfig, Mode};
use crate::infrastructure::reddit::RedditClient;
use crate::interface::features::build_features;
use crate::strings::logs;

#[derive(Debug, Parser)]
#[command(version, about = "Polls a subreddit and hands new items to bot features")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "THREADWATCH_CONFIG", default_value = "data/config.yaml")]
    config: PathBuf,

    /// Overrides the configured mode.
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Configuration
    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    // 2. Logging
    let _guard = init_tracing(&config.logging)?;
    tracing::info!("{}", logs::STARTING);
    tracing::info!(
        "{}",
        logs::config_loaded(
            &cli.config.display().to_string(),
            &format!("{:?}", config.mode).to_lowercase(),
            &config.forum,
        )
    );

    // 3. Reddit client
    let credentials = config.credentials()?;
    let client = Arc::new(
        RedditClient::new(credentials, &config.reddit.user_agent)
            .context("Failed to create Reddit client")?,
    );

    // 4. Features
    let features = build_features(
        config.enabled_features(),
        client.clone(),
        &config.features.commands,
    )?;
    tracing::info!("{}", logs::features_registered(&features.names()));

    // 5. Poll until the process is stopped
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(
        client,
        features,
        config.forum.clone(),
        PollSettings::from(&config.polling),
    );
    poller.run(shutdown_rx).await
}
