//! Wire formats for the Reddit JSON API and their conversion into domain items.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::types::{Comment, Distinguished, Identity, Message, Submission};
use crate::strings::logs;

const DELETED_AUTHOR: &str = "[deleted]";

/// `{"kind": "Listing", "data": {"children": [...]}}`
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// A listing child. `kind` is the fullname prefix (`t1` comment, `t3` link, `t4` message).
#[derive(Debug, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    name: String,
    author: Option<String>,
    body: Option<String>,
    parent_id: Option<String>,
    link_id: Option<String>,
    distinguished: Option<String>,
    #[serde(default)]
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    name: String,
    author: Option<String>,
    title: Option<String>,
    selftext: Option<String>,
    url: Option<String>,
    distinguished: Option<String>,
    #[serde(default)]
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    name: String,
    author: Option<String>,
    subject: Option<String>,
    body: Option<String>,
    distinguished: Option<String>,
    #[serde(default)]
    was_comment: bool,
    #[serde(default)]
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
pub struct MeResponse {
    pub name: String,
}

impl From<MeResponse> for Identity {
    fn from(me: MeResponse) -> Self {
        Identity { name: me.name }
    }
}

/// Token endpoint reply. Reddit reports some failures (e.g. `invalid_grant`) with a 200 status.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    pub error: Option<String>,
}

/// `POST /api/comment` reply with `api_type=json`.
#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub json: CommentResponseBody,
}

#[derive(Debug, Deserialize)]
pub struct CommentResponseBody {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

fn timestamp(created_utc: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(created_utc as i64, 0).unwrap_or_default()
}

fn author(raw: Option<String>) -> String {
    raw.unwrap_or_else(|| DELETED_AUTHOR.to_string())
}

/// Decodes the children whose kind is in `kinds`, in listing order. Other kinds are dropped.
fn decode<T: DeserializeOwned>(listing: Listing, kinds: &[&str]) -> Result<Vec<T>> {
    let mut items = Vec::with_capacity(listing.data.children.len());
    for thing in listing.data.children {
        if !kinds.contains(&thing.kind.as_str()) {
            tracing::warn!("{}", logs::unknown_listing_kind(&thing.kind));
            continue;
        }
        let item = serde_json::from_value(thing.data)
            .with_context(|| format!("Malformed {} in listing", thing.kind))?;
        items.push(item);
    }
    Ok(items)
}

impl Listing {
    pub fn into_comments(self) -> Result<Vec<Comment>> {
        Ok(decode::<CommentData>(self, &["t1"])?
            .into_iter()
            .map(|data| Comment {
                id: data.name,
                author: author(data.author),
                body: data.body,
                parent_id: data.parent_id,
                link_id: data.link_id,
                distinguished: Distinguished::from_raw(data.distinguished.as_deref()),
                created: timestamp(data.created_utc),
            })
            .collect())
    }

    pub fn into_submissions(self) -> Result<Vec<Submission>> {
        Ok(decode::<LinkData>(self, &["t3"])?
            .into_iter()
            .map(|data| Submission {
                id: data.name,
                author: author(data.author),
                title: data.title,
                body: data.selftext,
                url: data.url,
                distinguished: Distinguished::from_raw(data.distinguished.as_deref()),
                created: timestamp(data.created_utc),
            })
            .collect())
    }

    /// Inbox listings mix private messages (`t4`) with comment-reply notifications (`t1`).
    pub fn into_messages(self) -> Result<Vec<Message>> {
        Ok(decode::<MessageData>(self, &["t1", "t4"])?
            .into_iter()
            .map(|data| Message {
                id: data.name,
                author: author(data.author),
                subject: data.subject,
                body: data.body,
                distinguished: Distinguished::from_raw(data.distinguished.as_deref()),
                was_comment: data.was_comment,
                created: timestamp(data.created_utc),
            })
            .collect())
    }
}
