//! Test doubles shared by the unit tests.
//!
//! Provides:
//! - [`FakeSource`]: a scripted `ListingSource` that replays queued batches and records requests
//! - [`RecordingFeature`]: a `Feature` that records every delivery, optionally failing or panicking
//! - [`RecordingReplier`]: a `Replier` that records replies
//! - item constructors with sensible defaults

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::domain::command::Command;
use crate::domain::traits::{Feature, ListingSource, Replier};
use crate::domain::types::{
    Comment, Distinguished, Identity, Message, Page, Stream, Submission,
};

pub fn comment(id: &str, author: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        author: author.to_string(),
        body: Some(body.to_string()),
        parent_id: Some("t3_parent".to_string()),
        link_id: Some("t3_parent".to_string()),
        distinguished: Distinguished::None,
        created: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
    }
}

pub fn submission(id: &str, author: &str, title: &str) -> Submission {
    Submission {
        id: id.to_string(),
        author: author.to_string(),
        title: Some(title.to_string()),
        body: Some(String::new()),
        url: None,
        distinguished: Distinguished::None,
        created: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
    }
}

pub fn message(id: &str, author: &str, body: &str) -> Message {
    Message {
        id: id.to_string(),
        author: author.to_string(),
        subject: Some("subject".to_string()),
        body: Some(body.to_string()),
        distinguished: Distinguished::None,
        was_comment: false,
        created: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
    }
}

type Script<T> = Mutex<VecDeque<Result<Vec<T>, String>>>;

/// Replays queued responses in order; an exhausted queue yields empty batches.
pub struct FakeSource {
    identity: Result<String, String>,
    comments: Script<Comment>,
    submissions: Script<Submission>,
    messages: Script<Message>,
    requests: Mutex<Vec<(Stream, Page)>>,
}

impl FakeSource {
    pub fn new(bot_name: &str) -> Self {
        Self {
            identity: Ok(bot_name.to_string()),
            comments: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(VecDeque::new()),
            messages: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_identity(mut self, error: &str) -> Self {
        self.identity = Err(error.to_string());
        self
    }

    pub fn with_comments(self, batch: Vec<Comment>) -> Self {
        self.comments.lock().unwrap().push_back(Ok(batch));
        self
    }

    pub fn with_comment_error(self, error: &str) -> Self {
        self.comments.lock().unwrap().push_back(Err(error.to_string()));
        self
    }

    pub fn with_submissions(self, batch: Vec<Submission>) -> Self {
        self.submissions.lock().unwrap().push_back(Ok(batch));
        self
    }

    pub fn with_messages(self, batch: Vec<Message>) -> Self {
        self.messages.lock().unwrap().push_back(Ok(batch));
        self
    }

    pub fn with_message_error(self, error: &str) -> Self {
        self.messages.lock().unwrap().push_back(Err(error.to_string()));
        self
    }

    /// Every request made so far, in order.
    pub fn requests(&self) -> Vec<(Stream, Page)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, stream: Stream) -> Vec<Page> {
        self.requests()
            .into_iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, page)| page)
            .collect()
    }

    fn next<T>(&self, stream: Stream, page: &Page, script: &Script<T>) -> Result<Vec<T>> {
        self.requests.lock().unwrap().push((stream, page.clone()));
        match script.lock().unwrap().pop_front() {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(error)) => Err(anyhow!(error)),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl ListingSource for FakeSource {
    async fn identity(&self) -> Result<Identity> {
        match &self.identity {
            Ok(name) => Ok(Identity { name: name.clone() }),
            Err(error) => Err(anyhow!(error.clone())),
        }
    }

    async fn new_comments(&self, _forum: &str, page: &Page) -> Result<Vec<Comment>> {
        self.next(Stream::Comments, page, &self.comments)
    }

    async fn new_submissions(&self, _forum: &str, page: &Page) -> Result<Vec<Submission>> {
        self.next(Stream::Submissions, page, &self.submissions)
    }

    async fn inbox(&self, page: &Page) -> Result<Vec<Message>> {
        self.next(Stream::Messages, page, &self.messages)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub feature: String,
    pub stream: Option<Stream>,
    pub id: String,
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
    /// Sleeps before recording, then succeeds.
    Delay(Duration),
}

/// Records every call into a log that can be shared between several features,
/// so tests can assert on cross-feature ordering.
pub struct RecordingFeature {
    name: String,
    subscriptions: Vec<Stream>,
    behavior: Behavior,
    log: Arc<Mutex<Vec<Delivery>>>,
}

impl RecordingFeature {
    pub fn new(name: &str, subscriptions: &[Stream], log: Arc<Mutex<Vec<Delivery>>>) -> Self {
        Self {
            name: name.to_string(),
            subscriptions: subscriptions.to_vec(),
            behavior: Behavior::Succeed,
            log,
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    async fn record(&self, stream: Option<Stream>, id: &str, command: Option<&Command>) -> Result<()> {
        if let Behavior::Delay(delay) = self.behavior {
            tokio::time::sleep(delay).await;
        }
        self.log.lock().unwrap().push(Delivery {
            feature: self.name.clone(),
            stream,
            id: id.to_string(),
            command: command.cloned(),
        });
        match self.behavior {
            Behavior::Succeed | Behavior::Delay(_) => Ok(()),
            Behavior::Fail => bail!("{} failed on {}", self.name, id),
            Behavior::Panic => panic!("{} panicked on {}", self.name, id),
        }
    }
}

#[async_trait]
impl Feature for RecordingFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> &[Stream] {
        &self.subscriptions
    }

    async fn on_init(&self) -> Result<()> {
        self.record(None, "init", None).await
    }

    async fn on_comment(&self, comment: &Comment, command: Option<&Command>) -> Result<()> {
        self.record(Some(Stream::Comments), &comment.id, command).await
    }

    async fn on_submission(&self, submission: &Submission) -> Result<()> {
        self.record(Some(Stream::Submissions), &submission.id, None).await
    }

    async fn on_private_message(&self, message: &Message, command: Option<&Command>) -> Result<()> {
        self.record(Some(Stream::Messages), &message.id, command).await
    }
}

#[derive(Default)]
pub struct RecordingReplier {
    replies: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingReplier {
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn reply(&self, parent_id: &str, text: &str) -> Result<()> {
        if self.fail {
            bail!("403 Forbidden");
        }
        self.replies
            .lock()
            .unwrap()
            .push((parent_id.to_string(), text.to_string()));
        Ok(())
    }
}
