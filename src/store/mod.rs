//! Remote store — authenticated per-user settings and conversation rows.
//!
//! DESIGN
//! ======
//! The store is an opaque row service: one settings row and at most one
//! conversation row per user. The trait splits the conversation write into
//! `has` / `insert` / `update` so the synchronizer's check-then-act is the
//! only place that picks a verb, and tests can observe which one ran.
//!
//! [`TokenSource`] decouples the HTTP client from session lifecycle: the
//! current bearer token is read per request, never cached here, so a
//! sign-out invalidates in-flight authorization immediately.

pub mod auth;
pub mod http;
pub mod types;

pub use auth::{AuthApi, AuthError, AuthSession, HttpAuth};
pub use http::{HttpStore, StoreConfig};
pub use types::StoreError;

use uuid::Uuid;

use crate::types::{Message, Settings};

// =============================================================================
// TRAITS
// =============================================================================

/// Async seam over the remote row service. Enables mocking in tests.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the settings row for a user. `Ok(None)` means no row exists.
    async fn fetch_settings(&self, user_id: Uuid) -> Result<Option<Settings>, StoreError>;

    /// Create or replace the settings row for a user.
    async fn upsert_settings(&self, user_id: Uuid, settings: &Settings) -> Result<(), StoreError>;

    /// Fetch the newest conversation row for a user. `Ok(None)` means no row
    /// exists or its message payload did not decode.
    async fn fetch_latest_conversation(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Vec<Message>>, StoreError>;

    /// Whether any conversation row exists for a user.
    async fn has_conversation(&self, user_id: Uuid) -> Result<bool, StoreError>;

    /// Create a conversation row.
    async fn insert_conversation(
        &self,
        user_id: Uuid,
        messages: &[Message],
    ) -> Result<(), StoreError>;

    /// Replace the message payload of the existing conversation row.
    async fn update_conversation(
        &self,
        user_id: Uuid,
        messages: &[Message],
    ) -> Result<(), StoreError>;
}

/// Supplies the bearer token for store requests, if a session exists.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}
