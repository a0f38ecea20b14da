//! # Echo Feature
//!
//! Replies to everything it sees with `echo: <text>`. Useful for checking a deployment
//! end to end against a test subreddit. A failed reply is logged and not retried.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::logging::FeatureLogger;
use crate::domain::command::Command;
use crate::domain::traits::{Feature, Replier};
use crate::domain::types::{Comment, Message, Stream, Submission};
use crate::strings::messages;

pub const NAME: &str = "echo";

pub struct Echo {
    replier: Arc<dyn Replier>,
    logger: FeatureLogger,
}

impl Echo {
    pub fn new(replier: Arc<dyn Replier>) -> Self {
        Self {
            replier,
            logger: FeatureLogger::new(NAME),
        }
    }

    async fn echo(&self, id: &str, text: &str) -> Result<()> {
        self.logger.info(&format!("{id}: {text}"));
        if let Err(error) = self.replier.reply(id, &messages::echo(text)).await {
            self.logger.error(&format!("reply to {id} failed: {error:#}"));
        }
        Ok(())
    }
}

#[async_trait]
impl Feature for Echo {
    fn name(&self) -> &str {
        NAME
    }

    fn subscriptions(&self) -> &[Stream] {
        &Stream::ALL
    }

    async fn on_init(&self) -> Result<()> {
        self.logger.info("initialized");
        Ok(())
    }

    async fn on_comment(&self, comment: &Comment, _command: Option<&Command>) -> Result<()> {
        self.echo(&comment.id, comment.body.as_deref().unwrap_or_default())
            .await
    }

    async fn on_submission(&self, submission: &Submission) -> Result<()> {
        self.echo(&submission.id, submission.title.as_deref().unwrap_or_default())
            .await
    }

    async fn on_private_message(&self, message: &Message, _command: Option<&Command>) -> Result<()> {
        self.echo(&message.id, message.body.as_deref().unwrap_or_default())
            .await
    }
}
