//! Shared client state.
//!
//! DESIGN
//! ======
//! `ChatState` is the one structure every service function receives. It
//! holds the injected backends (session manager, remote store, LLM, local
//! cache) plus the live in-memory values: the resolved settings and the
//! current conversation. Clone is cheap — shared fields are Arc-wrapped,
//! so clones observe the same settings, conversation, and busy flag.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::RwLock;

use crate::cache::LocalCache;
use crate::llm::Complete;
use crate::session::SessionManager;
use crate::store::RemoteStore;
use crate::types::{Message, Settings};

// =============================================================================
// CHAT STATE
// =============================================================================

#[derive(Clone)]
pub struct ChatState {
    pub session: Arc<SessionManager>,
    pub store: Arc<dyn RemoteStore>,
    pub llm: Arc<dyn Complete>,
    pub cache: Arc<dyn LocalCache>,
    /// Resolved settings, live for every component that reads them.
    pub settings: Arc<RwLock<Settings>>,
    /// Current conversation, newest message last.
    pub conversation: Arc<RwLock<Vec<Message>>>,
    /// One send in flight at a time; a send issued while set is dropped.
    pub busy: Arc<AtomicBool>,
    /// System prompt prefix for every exchange.
    pub base_instruction: String,
}

impl ChatState {
    #[must_use]
    pub fn new(
        session: Arc<SessionManager>,
        store: Arc<dyn RemoteStore>,
        llm: Arc<dyn Complete>,
        cache: Arc<dyn LocalCache>,
        base_instruction: String,
    ) -> Self {
        Self {
            session,
            store,
            llm,
            cache,
            settings: Arc::new(RwLock::new(Settings::default())),
            conversation: Arc::new(RwLock::new(Vec::new())),
            busy: Arc::new(AtomicBool::new(false)),
            base_instruction,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
