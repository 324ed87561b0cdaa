//! Client facade — the embedder-facing surface over the shared state.
//!
//! DESIGN
//! ======
//! `ChatClient` owns a [`ChatState`] and exposes every operation a UI needs:
//! auth, settings, conversation, and sending. Each method is a thin
//! delegation to a service function; the only sequencing the facade adds is
//! the refresh after sign-in/sign-up and the local-data discard on sign-out,
//! so no stale or foreign data survives an identity change. Clones share the
//! same live state.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use thiserror::Error;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::cache::{FsCache, LocalCache};
use crate::llm::{Complete, CompletionError, GeminiClient};
use crate::services::chat::{self, ChatError};
use crate::services::{conversation, settings};
use crate::session::{SessionManager, SignUpOutcome};
use crate::state::ChatState;
use crate::store::{
    AuthError, AuthSession, HttpAuth, HttpStore, RemoteStore, StoreConfig, StoreError,
};
use crate::types::{Message, Settings, SettingsPatch};

// =============================================================================
// BUILD ERROR
// =============================================================================

/// Failure to assemble a client from the environment.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("BUNGPUI_STORE_URL is not set")]
    MissingStoreUrl,
    #[error("store client: {0}")]
    Store(#[from] StoreError),
    #[error("auth client: {0}")]
    Auth(#[from] AuthError),
    #[error("model client: {0}")]
    Llm(#[from] CompletionError),
}

// =============================================================================
// CHAT CLIENT
// =============================================================================

/// The one handle an embedding UI holds.
#[derive(Clone)]
pub struct ChatClient {
    state: ChatState,
}

impl ChatClient {
    #[must_use]
    pub fn new(
        session: Arc<SessionManager>,
        store: Arc<dyn RemoteStore>,
        llm: Arc<dyn Complete>,
        cache: Arc<dyn LocalCache>,
        base_instruction: String,
    ) -> Self {
        Self {
            state: ChatState::new(session, store, llm, cache, base_instruction),
        }
    }

    /// Wire the full production stack from the environment: HTTP auth and
    /// store against `BUNGPUI_STORE_URL`, the Gemini client, and the
    /// file-backed cache.
    pub fn from_env() -> Result<Self, BuildError> {
        let store_config = StoreConfig::from_env().ok_or(BuildError::MissingStoreUrl)?;
        let session = Arc::new(SessionManager::new(Arc::new(HttpAuth::new(&store_config)?)));
        let store = HttpStore::new(&store_config, session.clone())?;
        let llm = GeminiClient::from_env()?;
        info!(model = llm.model(), "client: model client initialized");

        Ok(Self::new(
            session,
            Arc::new(store),
            Arc::new(llm),
            Arc::new(FsCache::from_env()),
            chat::base_instruction_from_env(),
        ))
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    pub async fn session(&self) -> Option<AuthSession> {
        self.state.session.current().await
    }

    pub async fn user_id(&self) -> Option<Uuid> {
        self.state.session.user_id().await
    }

    /// Identity changes as `Some(user_id)` / `None`, for external observers.
    #[must_use]
    pub fn subscribe_session(&self) -> watch::Receiver<Option<Uuid>> {
        self.state.session.subscribe()
    }

    /// Sign up. When the store grants a session immediately the client is
    /// refreshed for the new identity; a pending e-mail confirmation leaves
    /// it signed out.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.state.session.sign_up(email, password).await?;
        if matches!(outcome, SignUpOutcome::SignedIn(_)) {
            self.refresh().await;
        }
        Ok(outcome)
    }

    /// Sign in, then reload settings and conversation for the new identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.state.session.sign_in(email, password).await?;
        self.refresh().await;
        Ok(())
    }

    /// Sign out: discard locally persisted data for both services, reset the
    /// in-memory values, then drop the session. Never fails.
    pub async fn sign_out(&self) {
        conversation::discard_local(&self.state).await;
        settings::discard_local(&self.state).await;
        self.state.session.sign_out().await;
        info!("client: signed out");
    }

    async fn refresh(&self) {
        settings::load(&self.state).await;
        conversation::load(&self.state).await;
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    /// The currently resolved settings.
    pub async fn settings(&self) -> Settings {
        settings::current(&self.state).await
    }

    /// Re-resolve settings from the remote-over-cache-over-defaults chain.
    pub async fn load_settings(&self) -> Settings {
        settings::load(&self.state).await
    }

    /// Apply a partial update; persists locally and best-effort remotely.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Settings {
        settings::update(&self.state, patch).await
    }

    /// Restore defaults everywhere.
    pub async fn reset_settings(&self) -> Settings {
        settings::reset(&self.state).await
    }

    // =========================================================================
    // CONVERSATION
    // =========================================================================

    /// The full in-memory conversation, oldest first.
    pub async fn messages(&self) -> Vec<Message> {
        conversation::messages(&self.state).await
    }

    /// The display slice: the last `context_window` exchanges (two messages
    /// each). Display-side only; the prompt lookback is independent.
    pub async fn visible_messages(&self) -> Vec<Message> {
        let window = usize::from(settings::current(&self.state).await.context_window);
        let mut history = conversation::messages(&self.state).await;
        let start = history.len().saturating_sub(2 * window);
        history.split_off(start)
    }

    /// Re-adopt the conversation from the remote-over-cache chain.
    pub async fn load_conversation(&self) -> Vec<Message> {
        conversation::load(&self.state).await
    }

    /// Send a message through the full exchange flow. `Ok(None)` when the
    /// input is blank or another send is already in flight.
    pub async fn send_message(&self, text: &str) -> Result<Option<Message>, ChatError> {
        chat::send(&self.state, text).await
    }

    /// Empty the conversation everywhere the user can see it again.
    pub async fn clear_conversation(&self) {
        conversation::clear(&self.state).await;
    }

    /// Whether a send is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.busy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
