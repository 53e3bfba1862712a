//! Reddit OAuth API client.
//!
//! Authenticates as a script app with the password grant and caches the
//! bearer token until shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::config::RedditConfig;
use crate::error::PlatformError;
use crate::platform::{Comment, Inbox, Mention, UserContent};

/// Refresh the token this long before the server-side expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Reddit API client for one bot account.
pub struct RedditClient {
    client: Client,
    config: RedditConfig,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: SecretString,
    expires_at: Instant,
}

impl RedditClient {
    /// Create a new client. The access token is fetched lazily on first use.
    pub fn new(config: RedditConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            token: Mutex::new(None),
        }
    }

    fn api_url(&self, path: &str) -> String {
        let base = self.config.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    async fn access_token(&self) -> Result<String, PlatformError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached
            .as_ref()
            .filter(|t| Instant::now() + TOKEN_EXPIRY_MARGIN < t.expires_at)
        {
            return Ok(token.value.expose_secret().to_string());
        }

        let url = format!(
            "{}/api/v1/access_token",
            self.config.auth_url.trim_end_matches('/')
        );
        tracing::debug!("Requesting Reddit access token from {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::AuthFailed {
                reason: format!("token request failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PlatformError::AuthFailed {
                reason: format!("HTTP {}: {}", status, body),
            });
        }

        // Bad credentials come back as 200 with an `error` field.
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| PlatformError::AuthFailed {
                reason: format!("token parse error: {e}"),
            })?;
        let access_token = match (token.access_token, token.error) {
            (Some(access_token), None) => access_token,
            (_, Some(error)) => return Err(PlatformError::AuthFailed { reason: error }),
            (None, None) => {
                return Err(PlatformError::AuthFailed {
                    reason: "token response had no access_token".to_string(),
                });
            }
        };

        let expires_in = token.expires_in.unwrap_or(3600);
        *cached = Some(CachedToken {
            value: SecretString::from(access_token.clone()),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });
        tracing::debug!(expires_in, "Reddit access token refreshed");
        Ok(access_token)
    }

    /// Send an authenticated request and decode the JSON response.
    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, PlatformError> {
        let token = self.access_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlatformError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 401 {
                *self.token.lock().await = None;
                return Err(PlatformError::AuthFailed {
                    reason: format!("HTTP 401: {}", body),
                });
            }
            return Err(PlatformError::Api {
                code: status.as_u16().to_string(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| PlatformError::InvalidResponse {
            reason: format!("JSON parse error: {e}"),
        })
    }
}

#[async_trait]
impl Inbox for RedditClient {
    async fn latest_mentions(&self, limit: usize) -> Result<Vec<Mention>, PlatformError> {
        let request = self
            .client
            .get(self.api_url("message/mentions"))
            .query(&[("limit", limit.to_string())]);
        let listing: Listing<MentionData> = self.send(request).await?;

        listing
            .data
            .children
            .into_iter()
            .map(|thing| {
                let data = thing.data;
                Ok(Mention {
                    created_at: timestamp(data.created_utc)?,
                    id: data.name,
                    author: data.author,
                    body: data.body,
                })
            })
            .collect()
    }

    async fn reply(&self, mention: &Mention, text: &str) -> Result<(), PlatformError> {
        let request = self.client.post(self.api_url("api/comment")).form(&[
            ("api_type", "json"),
            ("thing_id", mention.id.as_str()),
            ("text", text),
        ]);
        let response: CommentResponse = self.send(request).await?;

        if let Some(error) = response.json.errors.first() {
            let field = |i: usize| {
                error
                    .get(i)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            return Err(PlatformError::Api {
                code: field(0),
                message: field(1),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UserContent for RedditClient {
    async fn recent_comments(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<Comment>, PlatformError> {
        let path = format!("user/{}/comments", urlencoding::encode(username));
        let request = self
            .client
            .get(self.api_url(&path))
            .query(&[("sort", "new".to_string()), ("limit", limit.to_string())]);
        let listing: Listing<CommentData> = self.send(request).await?;

        listing
            .data
            .children
            .into_iter()
            .map(|thing| {
                let data = thing.data;
                Ok(Comment {
                    created_at: timestamp(data.created_utc)?,
                    id: data.name,
                    body: data.body,
                })
            })
            .collect()
    }
}

fn timestamp(created_utc: f64) -> Result<DateTime<Utc>, PlatformError> {
    DateTime::from_timestamp_millis((created_utc * 1000.0) as i64).ok_or_else(|| {
        PlatformError::InvalidResponse {
            reason: format!("created_utc out of range: {created_utc}"),
        }
    })
}

// ── Reddit API response types ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MentionData {
    name: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    body: String,
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    name: String,
    #[serde(default)]
    body: String,
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    json: CommentResponseJson,
}

#[derive(Debug, Deserialize)]
struct CommentResponseJson {
    /// Each error is `[code, message, field]`.
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
}
