//! # Dispatcher
//!
//! Delivers a batch of new items from one stream to the features subscribed to it.
//!
//! Per item, in the order the listing returned them:
//! 1. Items authored by the bot are skipped.
//! 2. Inbox comment-reply notifications and admin-distinguished messages are skipped.
//! 3. Comment and message bodies are run through the command parser.
//! 4. Every subscribed feature is called concurrently; all of them finish before the next item.
//!
//! Each feature call is isolated: an error or panic is logged and swallowed.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

use crate::application::parsing;
use crate::domain::command::Command;
use crate::domain::traits::Feature;
use crate::domain::types::{Comment, Distinguished, Item, Message, Stream, Submission};
use crate::strings::logs;

/// The ordered set of features for this session. Built once at startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct FeatureRegistry {
    features: Vec<Arc<dyn Feature>>,
    comments: Vec<Arc<dyn Feature>>,
    submissions: Vec<Arc<dyn Feature>>,
    messages: Vec<Arc<dyn Feature>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature. Registration order is invocation order.
    pub fn register(&mut self, feature: Arc<dyn Feature>) -> &mut Self {
        for stream in feature.subscriptions() {
            let list = match stream {
                Stream::Comments => &mut self.comments,
                Stream::Submissions => &mut self.submissions,
                Stream::Messages => &mut self.messages,
            };
            if !list.iter().any(|existing| Arc::ptr_eq(existing, &feature)) {
                list.push(feature.clone());
            }
        }
        self.features.push(feature);
        self
    }

    pub fn for_stream(&self, stream: Stream) -> &[Arc<dyn Feature>] {
        match stream {
            Stream::Comments => &self.comments,
            Stream::Submissions => &self.submissions,
            Stream::Messages => &self.messages,
        }
    }

    /// A stream with no subscribers is never fetched.
    pub fn is_polled(&self, stream: Stream) -> bool {
        !self.for_stream(stream).is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|feature| feature.name()).collect()
    }

    /// Runs every feature's `on_init` concurrently.
    pub async fn init_all(&self) {
        join_all(
            self.features
                .iter()
                .map(|feature| isolated(feature.name(), "on_init", feature.on_init())),
        )
        .await;
    }
}

/// Awaits a feature call, turning an error or a panic into a logged failure.
/// Returns whether the call succeeded.
pub async fn isolated<F>(feature: &str, operation: &str, call: F) -> bool
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(())) => true,
        Ok(Err(error)) => {
            tracing::error!(feature, operation, "{:#}", error);
            false
        }
        Err(panic) => {
            tracing::error!(feature, operation, "{}", logs::feature_panicked(&panic_message(&*panic)));
            false
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Why an item was withheld from features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OwnItem,
    CommentReply,
    AdminDistinguished,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::OwnItem => "own item",
            SkipReason::CommentReply => "comment reply notification",
            SkipReason::AdminDistinguished => "admin distinguished",
        }
    }
}

/// An item kind the dispatcher knows how to filter and deliver.
pub trait Dispatchable: Item {
    const STREAM: Stream;
    const OPERATION: &'static str;

    fn skip_reason(&self, bot_username: &str) -> Option<SkipReason> {
        (self.author() == bot_username).then_some(SkipReason::OwnItem)
    }

    /// The command embedded in the item, for kinds that carry one.
    fn command(&self) -> Option<Command>;

    fn deliver<'a>(
        &'a self,
        feature: &'a dyn Feature,
        command: Option<&'a Command>,
    ) -> BoxFuture<'a, Result<()>>;
}

impl Dispatchable for Comment {
    const STREAM: Stream = Stream::Comments;
    const OPERATION: &'static str = "on_comment";

    fn command(&self) -> Option<Command> {
        self.body().and_then(parsing::try_parse)
    }

    fn deliver<'a>(
        &'a self,
        feature: &'a dyn Feature,
        command: Option<&'a Command>,
    ) -> BoxFuture<'a, Result<()>> {
        feature.on_comment(self, command)
    }
}

impl Dispatchable for Submission {
    const STREAM: Stream = Stream::Submissions;
    const OPERATION: &'static str = "on_submission";

    fn command(&self) -> Option<Command> {
        None
    }

    fn deliver<'a>(
        &'a self,
        feature: &'a dyn Feature,
        _command: Option<&'a Command>,
    ) -> BoxFuture<'a, Result<()>> {
        feature.on_submission(self)
    }
}

impl Dispatchable for Message {
    const STREAM: Stream = Stream::Messages;
    const OPERATION: &'static str = "on_private_message";

    fn skip_reason(&self, bot_username: &str) -> Option<SkipReason> {
        if self.author == bot_username {
            Some(SkipReason::OwnItem)
        } else if self.was_comment {
            Some(SkipReason::CommentReply)
        } else if self.distinguished == Distinguished::Admin {
            // The platform rejects replies to these.
            Some(SkipReason::AdminDistinguished)
        } else {
            None
        }
    }

    fn command(&self) -> Option<Command> {
        self.body().and_then(parsing::try_parse)
    }

    fn deliver<'a>(
        &'a self,
        feature: &'a dyn Feature,
        command: Option<&'a Command>,
    ) -> BoxFuture<'a, Result<()>> {
        feature.on_private_message(self, command)
    }
}

/// Delivers `batch` to `features` and returns the id to advance the stream's cursor to:
/// the last item of the batch as supplied, or `None` for an empty batch.
pub async fn dispatch<I: Dispatchable>(
    batch: &[I],
    bot_username: &str,
    features: &[Arc<dyn Feature>],
) -> Option<String> {
    let stream = I::STREAM;
    for item in batch {
        if let Some(reason) = item.skip_reason(bot_username) {
            tracing::debug!(%stream, id = item.id(), "{}", logs::item_skipped(reason.as_str()));
            continue;
        }

        let command = item.command();
        join_all(features.iter().map(|feature| {
            isolated(
                feature.name(),
                I::OPERATION,
                item.deliver(feature.as_ref(), command.as_ref()),
            )
        }))
        .await;
    }

    batch.last().map(|item| item.id().to_string())
}
