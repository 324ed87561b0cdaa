//! HTTP remote store client.
//!
//! Thin reqwest wrapper over the row API. Transport and decode stay
//! separate: each endpoint method handles request/status plumbing and
//! delegates body decode to the pure helpers in [`super::types`].

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use super::types::{StoreError, conversation_row_body, decode_conversation_row, decode_settings_row};
use super::{RemoteStore, TokenSource};
use crate::types::{Message, Settings};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// CONFIG
// =============================================================================

/// Remote store endpoint configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl StoreConfig {
    /// Load from `BUNGPUI_STORE_URL`, plus optional `BUNGPUI_STORE_API_KEY`,
    /// `STORE_REQUEST_TIMEOUT_SECS` and `STORE_CONNECT_TIMEOUT_SECS`.
    /// Returns `None` when the URL is not set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("BUNGPUI_STORE_URL").ok()?;
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: std::env::var("BUNGPUI_STORE_API_KEY").ok(),
            request_timeout_secs: env_parse(
                "STORE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            connect_timeout_secs: env_parse(
                "STORE_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// CLIENT
// =============================================================================

/// Remote store client over HTTP. Bearer tokens are read from the
/// [`TokenSource`] per request.
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    tokens: Arc<dyn TokenSource>,
}

impl HttpStore {
    pub fn new(config: &StoreConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            tokens,
        })
    }

    fn user_url(&self, user_id: Uuid, resource: &str) -> String {
        format!("{}/rest/v1/users/{user_id}/{resource}", self.base_url)
    }

    /// Attach auth headers, send, and collapse the response to status + body.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), StoreError> {
        let mut request = request;
        if let Some(token) = self.tokens.access_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok((status, body))
    }

    fn expect_success(status: u16, body: String) -> Result<(), StoreError> {
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(StoreError::Response { status, body })
        }
    }
}

#[async_trait::async_trait]
impl RemoteStore for HttpStore {
    async fn fetch_settings(&self, user_id: Uuid) -> Result<Option<Settings>, StoreError> {
        let (status, body) = self
            .send(self.http.get(self.user_url(user_id, "settings")))
            .await?;
        match status {
            200..=299 => decode_settings_row(&body).map(Some),
            404 => Ok(None),
            _ => Err(StoreError::Response { status, body }),
        }
    }

    async fn upsert_settings(&self, user_id: Uuid, settings: &Settings) -> Result<(), StoreError> {
        let (status, body) = self
            .send(
                self.http
                    .put(self.user_url(user_id, "settings"))
                    .json(settings),
            )
            .await?;
        Self::expect_success(status, body)
    }

    async fn fetch_latest_conversation(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Vec<Message>>, StoreError> {
        let (status, body) = self
            .send(self.http.get(self.user_url(user_id, "conversation")))
            .await?;
        match status {
            200..=299 => {
                let row = decode_conversation_row(&body)?;
                if row.is_none() {
                    warn!(%user_id, "store: conversation payload malformed, treating row as absent");
                }
                Ok(row)
            }
            404 => Ok(None),
            _ => Err(StoreError::Response { status, body }),
        }
    }

    async fn has_conversation(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let url = format!("{}?fields=id", self.user_url(user_id, "conversation"));
        let (status, body) = self.send(self.http.get(url)).await?;
        match status {
            200..=299 => Ok(true),
            404 => Ok(false),
            _ => Err(StoreError::Response { status, body }),
        }
    }

    async fn insert_conversation(
        &self,
        user_id: Uuid,
        messages: &[Message],
    ) -> Result<(), StoreError> {
        let (status, body) = self
            .send(
                self.http
                    .post(self.user_url(user_id, "conversation"))
                    .json(&conversation_row_body(messages)),
            )
            .await?;
        Self::expect_success(status, body)
    }

    async fn update_conversation(
        &self,
        user_id: Uuid,
        messages: &[Message],
    ) -> Result<(), StoreError> {
        let (status, body) = self
            .send(
                self.http
                    .put(self.user_url(user_id, "conversation"))
                    .json(&conversation_row_body(messages)),
            )
            .await?;
        Self::expect_success(status, body)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
