//! Session lifecycle — the single owner of "who is signed in".
//!
//! DESIGN
//! ======
//! One `SessionManager` is shared by every component that needs identity:
//! the facade injects it into the store client as the bearer token source
//! and consults it before any per-user operation. Session transitions are
//! published on a watch channel so observers can react to sign-in and
//! sign-out without polling; the channel carries the user id only, never
//! the token.
//!
//! Sign-out is deliberately infallible: the remote revoke is best-effort
//! and the local session is cleared no matter what the server said.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{info, warn};
use uuid::Uuid;

use crate::store::{AuthApi, AuthError, AuthSession, TokenSource};

/// Result of a successful sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is active and a session was granted immediately.
    SignedIn(AuthSession),
    /// The account was created but email confirmation is pending; the user
    /// signs in after confirming.
    ConfirmationPending,
}

pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    session: RwLock<Option<AuthSession>>,
    changes: watch::Sender<Option<Uuid>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthApi>) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            auth,
            session: RwLock::new(None),
            changes,
        }
    }

    /// Current session, if signed in.
    pub async fn current(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    /// Current user id, if signed in.
    pub async fn user_id(&self) -> Option<Uuid> {
        self.session.read().await.as_ref().map(|s| s.user_id)
    }

    /// Observe session transitions. The channel carries the signed-in user
    /// id, or `None` after sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Uuid>> {
        self.changes.subscribe()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        match self.auth.sign_up(email, password).await? {
            Some(session) => {
                info!(user_id = %session.user_id, "session: sign-up granted a session");
                self.install(session.clone()).await;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => {
                info!("session: sign-up accepted, email confirmation pending");
                Ok(SignUpOutcome::ConfirmationPending)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let session = self.auth.sign_in(email, password).await?;
        info!(user_id = %session.user_id, "session: signed in");
        self.install(session.clone()).await;
        Ok(session)
    }

    /// Drop the session. Safe to call when not signed in.
    pub async fn sign_out(&self) {
        let previous = self.session.write().await.take();
        if let Some(session) = previous {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                warn!(error = %e, "session: remote sign-out failed, clearing locally anyway");
            }
            info!(user_id = %session.user_id, "session: signed out");
        }
        self.changes.send_replace(None);
    }

    async fn install(&self, session: AuthSession) {
        let user_id = session.user_id;
        *self.session.write().await = Some(session);
        self.changes.send_replace(Some(user_id));
    }
}

#[async_trait::async_trait]
impl TokenSource for SessionManager {
    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
