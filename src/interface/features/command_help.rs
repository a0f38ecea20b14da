//! # Command Help Feature
//!
//! Answers bodies that start with `!` but are not valid commands, so users learn the syntax
//! instead of being silently ignored.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::logging::FeatureLogger;
use crate::application::parsing::looks_like_command;
use crate::domain::command::Command;
use crate::domain::traits::{Feature, Replier};
use crate::domain::types::{Comment, Message, Stream};
use crate::strings::messages;

pub const NAME: &str = "command_help";

const SUBSCRIPTIONS: [Stream; 2] = [Stream::Comments, Stream::Messages];

pub struct CommandHelp {
    replier: Arc<dyn Replier>,
    commands: Vec<String>,
    logger: FeatureLogger,
}

impl CommandHelp {
    pub fn new(replier: Arc<dyn Replier>, commands: Vec<String>) -> Self {
        Self {
            replier,
            commands,
            logger: FeatureLogger::new(NAME),
        }
    }

    async fn check(&self, id: &str, body: Option<&str>, command: Option<&Command>) -> Result<()> {
        if command.is_some() || !body.is_some_and(looks_like_command) {
            return Ok(());
        }
        self.logger.info(&format!("invalid command in {id}"));
        if let Err(error) = self
            .replier
            .reply(id, &messages::invalid_command(&self.commands))
            .await
        {
            self.logger.error(&format!("reply to {id} failed: {error:#}"));
        }
        Ok(())
    }
}

#[async_trait]
impl Feature for CommandHelp {
    fn name(&self) -> &str {
        NAME
    }

    fn subscriptions(&self) -> &[Stream] {
        &SUBSCRIPTIONS
    }

    async fn on_comment(&self, comment: &Comment, command: Option<&Command>) -> Result<()> {
        self.check(&comment.id, comment.body.as_deref(), command).await
    }

    async fn on_private_message(&self, message: &Message, command: Option<&Command>) -> Result<()> {
        self.check(&message.id, message.body.as_deref(), command).await
    }
}
