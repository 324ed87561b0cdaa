//! Core chat types — messages, settings, and their persisted JSON forms.
//!
//! DESIGN
//! ======
//! `Message` and `Settings` are the two shapes that cross every boundary:
//! in-memory state, the local cache blob, and the remote store row all use
//! the same serde form (timestamps as RFC 3339 strings). Decoding persisted
//! data is tolerant by policy: a blob that fails to parse is a cache miss,
//! and a settings field that fails to validate falls back to its default, so
//! no partially-populated or malformed value ever reaches a consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFERRED_LANGUAGE: &str = "English";
pub const DEFAULT_SHOW_CODEBLOCKS: bool = true;
pub const DEFAULT_CONTEXT_WINDOW: u8 = 3;
pub const MIN_CONTEXT_WINDOW: u8 = 1;
pub const MAX_CONTEXT_WINDOW: u8 = 10;

// =============================================================================
// MESSAGE
// =============================================================================

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn id_prefix(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Creation-time derived id, e.g. `user_1718035200000`.
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a user message stamped with the current time.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::stamped(Role::User, content.into())
    }

    /// Build an assistant message stamped with the current time.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::stamped(Role::Assistant, content.into())
    }

    fn stamped(role: Role, content: String) -> Self {
        let now = Utc::now();
        Self { id: format!("{}_{}", role.id_prefix(), now.timestamp_millis()), role, content, timestamp: now }
    }
}

/// Serialize a message list for persistence. The cache blob and the remote
/// row payload stay byte-compatible because this is the only serializer.
#[must_use]
pub fn messages_to_json(messages: &[Message]) -> String {
    serde_json::to_string(messages).unwrap_or_else(|_| "[]".into())
}

/// Decode a persisted message list. Any parse failure is a miss, not an error.
#[must_use]
pub fn messages_from_json(raw: &str) -> Option<Vec<Message>> {
    serde_json::from_str(raw).ok()
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Fully-populated user settings. Consumers never see a partial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub preferred_language: String,
    pub show_codeblocks: bool,
    pub user_instruction: String,
    /// How many exchanges the client displays, `1..=10`. Display-side only;
    /// the prompt context sent upstream is a separate fixed lookback.
    pub context_window: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_language: DEFAULT_PREFERRED_LANGUAGE.into(),
            show_codeblocks: DEFAULT_SHOW_CODEBLOCKS,
            user_instruction: String::new(),
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }
}

impl Settings {
    /// Merge a partial update over this value, field-wise.
    #[must_use]
    pub fn apply(&self, patch: &SettingsPatch) -> Self {
        Self {
            preferred_language: patch
                .preferred_language
                .clone()
                .unwrap_or_else(|| self.preferred_language.clone()),
            show_codeblocks: patch.show_codeblocks.unwrap_or(self.show_codeblocks),
            user_instruction: patch
                .user_instruction
                .clone()
                .unwrap_or_else(|| self.user_instruction.clone()),
            context_window: patch.context_window.unwrap_or(self.context_window),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }

    /// Decode a persisted settings blob. `None` when the blob is not JSON;
    /// individual fields that fail validation fall back to their defaults.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        Some(Self::from_value(&value))
    }

    /// Tolerant field-wise decode: a missing, null, or mismatched field takes
    /// its default. `show_codeblocks: false` survives (absent and false are
    /// distinct); an empty language and an out-of-range window do not.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let defaults = Self::default();
        Self {
            preferred_language: value
                .get("preferred_language")
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map_or(defaults.preferred_language, str::to_owned),
            show_codeblocks: value
                .get("show_codeblocks")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(defaults.show_codeblocks),
            user_instruction: value
                .get("user_instruction")
                .and_then(serde_json::Value::as_str)
                .map_or(defaults.user_instruction, str::to_owned),
            context_window: value
                .get("context_window")
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| u8::try_from(n).ok())
                .filter(|n| (MIN_CONTEXT_WINDOW..=MAX_CONTEXT_WINDOW).contains(n))
                .unwrap_or(defaults.context_window),
        }
    }
}

/// Field-wise partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub preferred_language: Option<String>,
    pub show_codeblocks: Option<bool>,
    pub user_instruction: Option<String>,
    pub context_window: Option<u8>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferred_language.is_none()
            && self.show_codeblocks.is_none()
            && self.user_instruction.is_none()
            && self.context_window.is_none()
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
