//! # Domain Types
//!
//! Items read from the forum's three streams, plus the small value types
//! exchanged with the listing source.

use chrono::{DateTime, Utc};
use std::fmt;

/// One of the three independent content channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Comments,
    Submissions,
    Messages,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Comments, Stream::Submissions, Stream::Messages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Comments => "comments",
            Stream::Submissions => "submissions",
            Stream::Messages => "messages",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation marker attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Distinguished {
    #[default]
    None,
    Moderator,
    Admin,
    Special(String),
}

impl Distinguished {
    /// Maps the platform's nullable `distinguished` field.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Distinguished::None,
            Some("moderator") => Distinguished::Moderator,
            Some("admin") => Distinguished::Admin,
            Some(other) => Distinguished::Special(other.to_string()),
        }
    }
}

/// Fields shared by every kind of item.
pub trait Item: Send + Sync {
    /// Opaque fullname, e.g. `t1_abc123`.
    fn id(&self) -> &str;
    fn author(&self) -> &str;
    fn body(&self) -> Option<&str>;
    fn distinguished(&self) -> &Distinguished;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: Option<String>,
    pub parent_id: Option<String>,
    pub link_id: Option<String>,
    pub distinguished: Distinguished,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: String,
    pub author: String,
    pub title: Option<String>,
    /// Self-text; empty for link posts.
    pub body: Option<String>,
    pub url: Option<String>,
    pub distinguished: Distinguished,
    pub created: DateTime<Utc>,
}

/// An inbox entry. The inbox mixes true private messages with comment-reply
/// notifications; the latter have `was_comment` set.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub author: String,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub distinguished: Distinguished,
    pub was_comment: bool,
    pub created: DateTime<Utc>,
}

macro_rules! impl_item {
    ($($ty:ty),*) => {
        $(
            impl Item for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn author(&self) -> &str {
                    &self.author
                }

                fn body(&self) -> Option<&str> {
                    self.body.as_deref()
                }

                fn distinguished(&self) -> &Distinguished {
                    &self.distinguished
                }
            }
        )*
    };
}

impl_item!(Comment, Submission, Message);

/// The bot's own account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

/// A listing request: items newer than `before` (empty = unbounded), at most `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub before: String,
    pub limit: u32,
}

impl Page {
    pub fn new(before: impl Into<String>, limit: u32) -> Self {
        Self {
            before: before.into(),
            limit,
        }
    }

    /// The single most recent item, used to seed cursors.
    pub fn latest() -> Self {
        Self::new("", 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinguished_from_raw() {
        assert_eq!(Distinguished::from_raw(None), Distinguished::None);
        assert_eq!(Distinguished::from_raw(Some("")), Distinguished::None);
        assert_eq!(Distinguished::from_raw(Some("moderator")), Distinguished::Moderator);
        assert_eq!(Distinguished::from_raw(Some("admin")), Distinguished::Admin);
        assert_eq!(
            Distinguished::from_raw(Some("special")),
            Distinguished::Special("special".to_string())
        );
    }
}
