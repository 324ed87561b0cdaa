//! Gemini `generateContent` API client.
//!
//! Thin HTTP wrapper for `/models/{model}:generateContent`. Pure parsing in
//! `parse_response` for testability. The wire structs are deliberately
//! loose: a 2xx body with no usable candidate text is not an error, it
//! yields [`EMPTY_REPLY_FALLBACK`] (this is what the API returns when every
//! candidate was safety-filtered).

use std::time::Duration;

use super::config::LlmConfig;
use super::types::{Complete, CompletionError};

/// Reply used when the API answers 2xx without candidate text.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I couldn't generate a response.";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| CompletionError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key,
            model: config.model,
            base_url: config.base_url,
        })
    }

    /// Build a client from environment variables (see [`LlmConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Configured model name (e.g. `"gemini-2.0-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait::async_trait]
impl Complete for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self
            .http
            .post(self.request_url())
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| CompletionError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::ApiRequest(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(CompletionError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    })
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(serde::Deserialize)]
struct Part {
    text: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<String, CompletionError> {
    let api: ApiResponse =
        serde_json::from_str(json).map_err(|e| CompletionError::ApiParse(e.to_string()))?;

    let reply = api
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.is_empty());

    Ok(reply.unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string()))
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
