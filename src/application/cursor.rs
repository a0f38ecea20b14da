//! # Cursor Tracking
//!
//! One opaque "before" token per stream. Listings only return items created after the
//! item the token names, so the bot never sees the same item twice within a session.
//!
//! The polling loop owns the `Cursors` record and threads it through each cycle: it is
//! read when fetching and replaced with the dispatcher's results afterwards. Nothing else
//! holds a reference to it, so no locking is needed. Cursors are not persisted.

use std::fmt;

use crate::domain::types::Stream;

/// An opaque item fullname. Empty means "no lower bound".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unbounded(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursors {
    comments: Cursor,
    submissions: Cursor,
    messages: Cursor,
}

impl Cursors {
    pub fn get(&self, stream: Stream) -> &Cursor {
        match stream {
            Stream::Comments => &self.comments,
            Stream::Submissions => &self.submissions,
            Stream::Messages => &self.messages,
        }
    }

    fn slot(&mut self, stream: Stream) -> &mut Cursor {
        match stream {
            Stream::Comments => &mut self.comments,
            Stream::Submissions => &mut self.submissions,
            Stream::Messages => &mut self.messages,
        }
    }

    /// Sets the starting point from the most recent existing item, if any.
    pub fn seed(&mut self, stream: Stream, latest: Option<&str>) {
        *self.slot(stream) = latest.map(Cursor::new).unwrap_or_default();
    }

    /// Overwrites the token. Callers only pass the id designated by the dispatcher
    /// for the batch just processed.
    pub fn advance(&mut self, stream: Stream, newest_handled: impl Into<String>) {
        *self.slot(stream) = Cursor::new(newest_handled);
    }
}
