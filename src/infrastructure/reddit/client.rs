//! # Reddit Client
//!
//! `ListingSource` and `Replier` over Reddit's OAuth JSON API, authenticated as a script app
//! that already holds a refresh token.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::types::{CommentResponse, Listing, MeResponse, TokenResponse};
use crate::domain::config::Credentials;
use crate::domain::traits::{ListingSource, Replier};
use crate::domain::types::{Comment, Identity, Message, Page, Submission};
use crate::strings::logs;

const API_BASE: &str = "https://oauth.reddit.com";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Tokens are refreshed this long before Reddit says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn new(value: String, expires_in: u64) -> Self {
        let lifetime = Duration::from_secs(expires_in).saturating_sub(EXPIRY_MARGIN);
        Self {
            value,
            expires_at: Instant::now() + lifetime,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

pub struct RedditClient {
    http: Client,
    credentials: Credentials,
    api_base: String,
    token_url: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    pub fn new(credentials: Credentials, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            credentials,
            api_base: API_BASE.to_string(),
            token_url: TOKEN_URL.to_string(),
            token: Mutex::new(None),
        })
    }

    #[cfg(test)]
    fn with_endpoints(mut self, api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Returns a valid bearer token, refreshing it if it is missing or about to expire.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }

        let fresh = self.refresh_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn refresh_token(&self) -> Result<AccessToken> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .context("Token request failed")?;

        let reply: TokenResponse = parse(response).await.context("Token refresh failed")?;
        let value = match (reply.access_token, reply.error) {
            (Some(value), _) => value,
            (None, Some(error)) => bail!("Token refresh failed: {}", error),
            (None, None) => bail!("Token refresh failed: no access_token in response"),
        };

        tracing::info!("{}", logs::token_refreshed(reply.expires_in));
        Ok(AccessToken::new(value, reply.expires_in))
    }

    /// Sends with the bearer token. A 401 drops the cached token so the next call refreshes it.
    async fn authorized(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
        }
        Ok(response)
    }

    async fn listing(&self, path: &str, page: &Page) -> Result<Listing> {
        let limit = page.limit.to_string();
        let request = self.http.get(self.url(path)).query(&[
            ("before", page.before.as_str()),
            ("limit", limit.as_str()),
            ("raw_json", "1"),
        ]);
        let response = self.authorized(request).await?;
        parse(response)
            .await
            .with_context(|| format!("GET {} failed", path))
    }
}

/// Maps a non-2xx status to an error carrying the body, otherwise decodes the JSON body.
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        bail!("HTTP {}: {}", status, body);
    }

    response
        .json()
        .await
        .map_err(|e| anyhow!("Failed to parse response: {}", e))
}

#[async_trait]
impl ListingSource for RedditClient {
    async fn identity(&self) -> Result<Identity> {
        let response = self.authorized(self.http.get(self.url("/api/v1/me"))).await?;
        let me: MeResponse = parse(response).await.context("GET /api/v1/me failed")?;
        Ok(me.into())
    }

    async fn new_comments(&self, forum: &str, page: &Page) -> Result<Vec<Comment>> {
        self.listing(&format!("/r/{}/comments", forum), page)
            .await?
            .into_comments()
    }

    async fn new_submissions(&self, forum: &str, page: &Page) -> Result<Vec<Submission>> {
        self.listing(&format!("/r/{}/new", forum), page)
            .await?
            .into_submissions()
    }

    async fn inbox(&self, page: &Page) -> Result<Vec<Message>> {
        self.listing("/message/inbox", page).await?.into_messages()
    }
}

#[async_trait]
impl Replier for RedditClient {
    async fn reply(&self, parent_id: &str, text: &str) -> Result<()> {
        let request = self.http.post(self.url("/api/comment")).form(&[
            ("api_type", "json"),
            ("thing_id", parent_id),
            ("text", text),
        ]);
        let response = self.authorized(request).await?;
        let reply: CommentResponse = parse(response)
            .await
            .with_context(|| format!("Reply to {} failed", parent_id))?;

        if !reply.json.errors.is_empty() {
            bail!(
                "Reply to {} rejected: {}",
                parent_id,
                serde_json::Value::from(reply.json.errors)
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    #[test]
    fn test_endpoints_are_normalized() {
        let client = RedditClient::new(credentials(), "threadwatch test")
            .unwrap()
            .with_endpoints("http://127.0.0.1:9/", "http://127.0.0.1:9/token");

        assert_eq!(client.url("/api/v1/me"), "http://127.0.0.1:9/api/v1/me");
        assert_eq!(client.token_url, "http://127.0.0.1:9/token");
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_expires_before_reddit_says() {
        let token = AccessToken::new("abc".to_string(), 3600);
        assert!(token.is_fresh());

        tokio::time::advance(Duration::from_secs(3600) - EXPIRY_MARGIN).await;
        assert!(!token.is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_lived_token_is_never_fresh() {
        let token = AccessToken::new("abc".to_string(), 30);
        assert!(!token.is_fresh());
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let client = RedditClient::new(credentials(), "threadwatch test")
            .unwrap()
            .with_endpoints("http://127.0.0.1:9", "http://127.0.0.1:9/token");
        *client.token.lock().await = Some(AccessToken::new("cached".to_string(), 3600));

        assert_eq!(client.access_token().await.unwrap(), "cached");
    }

    /// Serves a single canned HTTP response on a local port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn test_unauthorized_response_drops_cached_token() {
        let base = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: 41\r\nConnection: close\r\n\r\n{\"message\": \"Unauthorized\", \"error\": 401}",
        )
        .await;
        let client = RedditClient::new(credentials(), "threadwatch test")
            .unwrap()
            .with_endpoints(base.as_str(), format!("{}/token", base));
        *client.token.lock().await = Some(AccessToken::new("revoked".to_string(), 3600));

        let error = client.identity().await.unwrap_err();

        assert!(format!("{:#}", error).contains("401"));
        assert!(client.token.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint_is_an_error() {
        let client = RedditClient::new(credentials(), "threadwatch test")
            .unwrap()
            .with_endpoints("http://127.0.0.1:9", "http://127.0.0.1:9/token");

        let error = client.identity().await.unwrap_err();
        assert!(format!("{:#}", error).contains("Token request failed"));
    }
}
