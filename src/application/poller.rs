//! # Polling Loop
//!
//! Drives the bot: seeds a cursor per stream from the newest existing item, then repeatedly
//! fetches whatever is newer, hands each batch to the dispatcher and sleeps a fixed interval.
//!
//! Within a cycle each polled stream runs its own fetch then dispatch, concurrently with the
//! others; a cycle completes before the next cycle's fetch starts. A failed fetch is logged and
//! only that stream keeps its cursor until the next cycle. There is no backoff.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use tokio::sync::watch;

use crate::application::cursor::Cursors;
use crate::application::dispatch::{Dispatchable, FeatureRegistry, dispatch};
use crate::domain::config::PollingConfig;
use crate::domain::traits::ListingSource;
use crate::domain::types::{Comment, Item, Message, Page, Stream, Submission};
use crate::strings::logs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub page_size: u32,
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            page_size: config.page_size,
        }
    }
}

/// An item kind with its own listing endpoint.
pub trait Listed: Dispatchable + Sized {
    fn fetch<'a>(
        source: &'a dyn ListingSource,
        forum: &'a str,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Vec<Self>>>;
}

impl Listed for Comment {
    fn fetch<'a>(
        source: &'a dyn ListingSource,
        forum: &'a str,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Vec<Self>>> {
        source.new_comments(forum, page)
    }
}

impl Listed for Submission {
    fn fetch<'a>(
        source: &'a dyn ListingSource,
        forum: &'a str,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Vec<Self>>> {
        source.new_submissions(forum, page)
    }
}

impl Listed for Message {
    fn fetch<'a>(
        source: &'a dyn ListingSource,
        _forum: &'a str,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Vec<Self>>> {
        source.inbox(page)
    }
}

pub struct Poller {
    source: Arc<dyn ListingSource>,
    features: FeatureRegistry,
    forum: String,
    settings: PollSettings,
}

impl Poller {
    pub fn new(
        source: Arc<dyn ListingSource>,
        features: FeatureRegistry,
        forum: impl Into<String>,
        settings: PollSettings,
    ) -> Self {
        Self {
            source,
            features,
            forum: forum.into(),
            settings,
        }
    }

    /// Runs until `shutdown` becomes `true`. Returns early if no stream has subscribers.
    /// Errors only if startup (identity or cursor seeding) fails.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        for stream in Stream::ALL {
            tracing::info!("{}", logs::poll_stream(stream, self.features.is_polled(stream)));
        }
        if !Stream::ALL.into_iter().any(|stream| self.features.is_polled(stream)) {
            tracing::warn!("{}", logs::NO_FEATURES);
            return Ok(());
        }

        self.features.init_all().await;
        let (bot_username, mut cursors) = self.initialize().await?;

        loop {
            if *shutdown.borrow() {
                tracing::info!("{}", logs::SHUTDOWN);
                return Ok(());
            }

            cursors = self.cycle(&bot_username, &cursors).await;

            self.sleep(&mut shutdown).await;
        }
    }

    /// Fetches the bot's identity and seeds a cursor for every polled stream.
    pub(crate) async fn initialize(&self) -> Result<(String, Cursors)> {
        let (identity, comments, submissions, messages) = tokio::try_join!(
            self.source.identity(),
            self.latest::<Comment>(),
            self.latest::<Submission>(),
            self.latest::<Message>(),
        )
        .context("Failed to initialize polling")?;

        tracing::info!("{}", logs::bot_username(&identity.name));

        let mut cursors = Cursors::default();
        for (stream, latest) in [
            (Stream::Comments, comments),
            (Stream::Submissions, submissions),
            (Stream::Messages, messages),
        ] {
            if self.features.is_polled(stream) {
                cursors.seed(stream, latest.as_deref());
                tracing::info!("{}", logs::cursor_seeded(stream, cursors.get(stream).as_str()));
            }
        }

        Ok((identity.name, cursors))
    }

    /// One fetch + dispatch round. Returns the cursors for the next round.
    pub(crate) async fn cycle(&self, bot_username: &str, cursors: &Cursors) -> Cursors {
        let (comments, submissions, messages) = tokio::join!(
            self.poll_stream::<Comment>(bot_username, cursors),
            self.poll_stream::<Submission>(bot_username, cursors),
            self.poll_stream::<Message>(bot_username, cursors),
        );

        let mut next = cursors.clone();
        for (stream, outcome) in [
            (Stream::Comments, comments),
            (Stream::Submissions, submissions),
            (Stream::Messages, messages),
        ] {
            match outcome {
                Ok(Some(id)) => next.advance(stream, id),
                Ok(None) => {}
                Err(error) => {
                    tracing::error!("{}", logs::cycle_failed(stream, &format!("{:#}", error)));
                }
            }
        }
        next
    }

    /// Fetches one stream and dispatches the batch. Returns the id to advance its cursor to.
    async fn poll_stream<I: Listed>(
        &self,
        bot_username: &str,
        cursors: &Cursors,
    ) -> Result<Option<String>> {
        let batch = self.fetch::<I>(cursors).await?;
        Ok(self.dispatch_batch(batch, bot_username).await)
    }

    async fn latest<I: Listed>(&self) -> Result<Option<String>> {
        if !self.features.is_polled(I::STREAM) {
            return Ok(None);
        }
        let page = Page::latest();
        let items = I::fetch(self.source.as_ref(), &self.forum, &page)
            .await
            .with_context(|| format!("Failed to fetch latest {}", I::STREAM))?;
        Ok(items.first().map(|item| item.id().to_string()))
    }

    async fn fetch<I: Listed>(&self, cursors: &Cursors) -> Result<Option<Vec<I>>> {
        if !self.features.is_polled(I::STREAM) {
            return Ok(None);
        }
        let cursor = cursors.get(I::STREAM);
        tracing::debug!("{}", logs::retrieving(I::STREAM, &cursor.to_string()));

        let page = Page::new(cursor.as_str(), self.settings.page_size);
        I::fetch(self.source.as_ref(), &self.forum, &page)
            .await
            .map(Some)
            .with_context(|| format!("Failed to fetch {}", I::STREAM))
    }

    async fn dispatch_batch<I: Listed>(
        &self,
        batch: Option<Vec<I>>,
        bot_username: &str,
    ) -> Option<String> {
        let batch = batch?;
        if batch.is_empty() {
            tracing::debug!("{}", logs::no_items(I::STREAM));
            return None;
        }
        tracing::info!("{}", logs::items_found(I::STREAM, batch.len()));
        dispatch(&batch, bot_username, self.features.for_stream(I::STREAM)).await
    }

    /// Sleeps for the interval, waking early if shutdown is signalled.
    async fn sleep(&self, shutdown: &mut watch::Receiver<bool>) {
        let sleep = tokio::time::sleep(self.settings.interval);
        tokio::pin!(sleep);

        tokio::select! {
            _ = &mut sleep => {}
            changed = shutdown.changed() => {
                // A dropped sender can never signal; finish the interval normally.
                if changed.is_err() {
                    sleep.await;
                }
            }
        }
    }
}
