//! Remote store wire shapes and errors.
//!
//! Row decode is tolerant by policy: field-level mismatches in a settings
//! row fall back per-field, a conversation row whose message payload does
//! not decode is reported as absent, and a body that is not JSON at all is
//! a [`StoreError::Decode`] the callers absorb like an unreachable remote.

use chrono::Utc;
use serde_json::Value;

use crate::types::{Message, Settings};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote store operations. All of these are absorbed by
/// the settings resolver and the conversation synchronizer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request to the store failed.
    #[error("store request failed: {0}")]
    Request(String),

    /// The store returned a non-success HTTP status.
    #[error("store response error: status {status}")]
    Response { status: u16, body: String },

    /// The store response body could not be deserialized.
    #[error("store response parse failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// WIRE DECODE
// =============================================================================

/// Decode a settings row body into fully-populated settings.
pub(crate) fn decode_settings_row(body: &str) -> Result<Settings, StoreError> {
    let value: Value = serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(Settings::from_value(&value))
}

/// Decode a conversation row body. `Ok(None)` when the `messages` payload is
/// missing or malformed — the row is then treated exactly like no row.
pub(crate) fn decode_conversation_row(body: &str) -> Result<Option<Vec<Message>>, StoreError> {
    let value: Value = serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;
    let Some(messages) = value.get("messages") else {
        return Ok(None);
    };
    Ok(serde_json::from_value(messages.clone()).ok())
}

/// Row payload for conversation insert/update: the full message list plus
/// the freshness timestamp the store orders rows by.
pub(crate) fn conversation_row_body(messages: &[Message]) -> Value {
    serde_json::json!({
        "messages": messages,
        "timestamp": Utc::now(),
    })
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
