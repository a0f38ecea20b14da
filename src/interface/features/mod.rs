//! # Features
//!
//! Built-in `Feature` implementations and the name-based factory used at startup.

pub mod command_help;
pub mod echo;

use std::sync::Arc;

use anyhow::{Result, bail};

use crate::application::dispatch::FeatureRegistry;
use crate::domain::traits::Replier;

/// Builds the registry from configured feature names, preserving their order.
pub fn build_features(
    names: &[String],
    replier: Arc<dyn Replier>,
    commands: &[String],
) -> Result<FeatureRegistry> {
    let mut registry = FeatureRegistry::new();
    for name in names {
        match name.as_str() {
            echo::NAME => registry.register(Arc::new(echo::Echo::new(replier.clone()))),
            command_help::NAME => registry.register(Arc::new(command_help::CommandHelp::new(
                replier.clone(),
                commands.to_vec(),
            ))),
            unknown => bail!("Unknown feature '{}' in configuration", unknown),
        };
    }
    Ok(registry)
}
