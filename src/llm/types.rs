//! LLM types — the completion trait and its errors.

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// COMPLETION TRAIT
// =============================================================================

/// Provider-neutral async trait for one-shot text completion. Enables
/// mocking in tests.
#[async_trait::async_trait]
pub trait Complete: Send + Sync {
    /// Send a fully-assembled prompt and return the model's reply text.
    ///
    /// # Errors
    ///
    /// Returns a [`CompletionError`] if the request fails or the response
    /// is malformed.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
