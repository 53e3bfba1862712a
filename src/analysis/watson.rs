//! IBM Watson Personality Insights provider.
//!
//! Exchanges the API key for an IAM bearer token, then posts the document as
//! plain text to `/v3/profile` asking for consumption preferences and raw
//! scores.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::analysis::{AnalysisResult, PersonalityAnalyzer};
use crate::config::WatsonConfig;
use crate::error::AnalysisError;

/// Refresh the IAM token this long before the server-side expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Watson Personality Insights client.
pub struct WatsonPersonalityInsights {
    client: Client,
    config: WatsonConfig,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: SecretString,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

impl WatsonPersonalityInsights {
    /// Create a new client. The IAM token is fetched lazily on first use.
    pub fn new(config: WatsonConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            token: Mutex::new(None),
        }
    }

    fn api_url(&self, path: &str) -> String {
        let base = self.config.service_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Return a valid bearer token, exchanging the API key when needed.
    async fn bearer_token(&self) -> Result<String, AnalysisError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.expose_secret().to_string());
        }

        let url = format!(
            "{}/identity/token",
            self.config.iam_url.trim_end_matches('/')
        );
        tracing::debug!("Requesting IAM token from {}", url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", IAM_GRANT_TYPE),
                ("apikey", self.config.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::AuthFailed {
                reason: format!("IAM request failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AnalysisError::AuthFailed {
                reason: format!("IAM returned HTTP {}: {}", status, body),
            });
        }

        let token: IamTokenResponse =
            serde_json::from_str(&body).map_err(|e| AnalysisError::AuthFailed {
                reason: format!("IAM token parse error: {e}"),
            })?;

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: SecretString::from(token.access_token),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        tracing::debug!(expires_in = token.expires_in, "IAM token refreshed");
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl PersonalityAnalyzer for WatsonPersonalityInsights {
    fn name(&self) -> &str {
        "watson"
    }

    async fn analyze(&self, document: &str) -> Result<AnalysisResult, AnalysisError> {
        let token = self.bearer_token().await?;
        let url = self.api_url("v3/profile");

        tracing::debug!(
            chars = document.len(),
            "Sending document to Personality Insights"
        );

        let response = self
            .client
            .post(&url)
            .query(&[
                ("version", self.config.version.as_str()),
                ("consumption_preferences", "true"),
                ("raw_scores", "true"),
            ])
            .bearer_auth(token)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .header(ACCEPT, "application/json")
            .header("x-watson-learning-opt-out", "true")
            .body(document.to_string())
            .send()
            .await
            .map_err(|e| AnalysisError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 401 {
                // Force a fresh token next time instead of reusing a revoked one.
                self.invalidate_token().await;
            }
            let message = serde_json::from_str::<WatsonErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(body);
            return Err(AnalysisError::Service {
                code: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| AnalysisError::InvalidResponse {
            reason: format!("JSON parse error: {e}"),
        })
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct WatsonErrorBody {
    #[serde(default)]
    error: Option<String>,
}
