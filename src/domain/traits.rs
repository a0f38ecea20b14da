//! # Domain Traits
//!
//! Abstract interfaces at the edges of the core: where items come from,
//! how features react to them, and how features talk back to the forum.
//! Allows for pluggable implementations in the Infrastructure and Interface layers.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::command::Command;
use crate::domain::types::{Comment, Identity, Message, Page, Stream, Submission};

/// Abstract interface for the forum's listing API.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// The bot's own account.
    async fn identity(&self) -> Result<Identity>;

    /// Comments on `forum` newer than `page.before`.
    async fn new_comments(&self, forum: &str, page: &Page) -> Result<Vec<Comment>>;

    /// Submissions on `forum` newer than `page.before`.
    async fn new_submissions(&self, forum: &str, page: &Page) -> Result<Vec<Submission>>;

    /// Inbox entries (private messages and comment-reply notifications) newer than `page.before`.
    async fn inbox(&self, page: &Page) -> Result<Vec<Message>>;
}

/// Abstract interface for posting a reply under an item.
#[async_trait]
pub trait Replier: Send + Sync {
    /// Reply to the item with the given fullname.
    async fn reply(&self, parent_id: &str, text: &str) -> Result<()>;
}

/// A pluggable handler reacting to items and parsed commands.
///
/// Every capability defaults to a no-op so a feature only implements what it needs.
/// The dispatcher only calls a capability for streams listed in `subscriptions`.
#[async_trait]
pub trait Feature: Send + Sync {
    /// Context tag used in logs.
    fn name(&self) -> &str;

    /// Streams this feature wants to receive.
    fn subscriptions(&self) -> &[Stream];

    async fn on_init(&self) -> Result<()> {
        Ok(())
    }

    async fn on_comment(&self, _comment: &Comment, _command: Option<&Command>) -> Result<()> {
        Ok(())
    }

    async fn on_submission(&self, _submission: &Submission) -> Result<()> {
        Ok(())
    }

    async fn on_private_message(
        &self,
        _message: &Message,
        _command: Option<&Command>,
    ) -> Result<()> {
        Ok(())
    }
}
