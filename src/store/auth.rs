//! Auth endpoints — email/password sign-up, sign-in, and sign-out.
//!
//! Thin HTTP wrapper over the store's auth API. Response decode lives in
//! pure functions (`parse_session`, `parse_sign_up`) so the formats are
//! testable without a server. Unlike row operations, auth failures are not
//! absorbed: callers surface them to the user.

use std::time::Duration;

use uuid::Uuid;

use super::http::StoreConfig;

// =============================================================================
// TYPES
// =============================================================================

/// A granted session: the authenticated identity and its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub access_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The store rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The HTTP request to the auth endpoint failed.
    #[error("auth request failed: {0}")]
    Request(String),

    /// The auth endpoint returned an unexpected HTTP status.
    #[error("auth response error: status {status}")]
    Response { status: u16, body: String },

    /// The auth response body could not be deserialized.
    #[error("auth response parse failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Async seam over the auth endpoints. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Register a new account. `Ok(None)` means the account was created but
    /// email confirmation is still pending, so no session exists yet.
    async fn sign_up(&self, email: &str, password: &str)
    -> Result<Option<AuthSession>, AuthError>;

    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Revoke the given token server-side.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpAuth {
    pub fn new(config: &StoreConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<(u16, String), AuthError> {
        let mut request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let (status, body) = self.post_credentials("/auth/v1/signup", email, password).await?;
        if !(200..300).contains(&status) {
            return Err(AuthError::Response { status, body });
        }
        parse_sign_up(&body)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let (status, body) = self.post_credentials("/auth/v1/token", email, password).await?;
        match status {
            200..=299 => parse_session(&body),
            400 | 401 => Err(AuthError::InvalidCredentials),
            _ => Err(AuthError::Response { status, body }),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut request = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .bearer_auth(access_token);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AuthError::Response { status, body })
        }
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

#[derive(serde::Deserialize)]
struct SessionResponse {
    user_id: Uuid,
    access_token: String,
}

#[derive(serde::Deserialize)]
struct SignUpResponse {
    user_id: Uuid,
    access_token: Option<String>,
}

fn parse_session(json: &str) -> Result<AuthSession, AuthError> {
    let resp: SessionResponse =
        serde_json::from_str(json).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok(AuthSession {
        user_id: resp.user_id,
        access_token: resp.access_token,
    })
}

/// Sign-up responses omit `access_token` when email confirmation is pending.
fn parse_sign_up(json: &str) -> Result<Option<AuthSession>, AuthError> {
    let resp: SignUpResponse =
        serde_json::from_str(json).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok(resp.access_token.map(|access_token| AuthSession {
        user_id: resp.user_id,
        access_token,
    }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
