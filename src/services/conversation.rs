//! Conversation service — history sync between memory, cache, and remote.
//!
//! DESIGN
//! ======
//! The in-memory list is the working copy. The cache mirrors it on every
//! append, and the remote holds at most one row per user, kept whole-list
//! by check-then-act: update when a row exists, insert otherwise. Absorb
//! policy matches the settings service — remote failures degrade with a
//! `warn!`, appends never fail.

use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::HISTORY_KEY;
use crate::state::ChatState;
use crate::types::{Message, messages_from_json, messages_to_json};

// =============================================================================
// OPERATIONS
// =============================================================================

/// Current in-memory conversation.
pub async fn messages(state: &ChatState) -> Vec<Message> {
    state.conversation.read().await.clone()
}

/// Resolve the conversation for the current identity and make it live.
///
/// Signed in, a non-empty remote row wins and is mirrored to the cache; a
/// missing, empty, or unreachable row falls back to the cache. Signed out,
/// the result is empty and the cache is not read.
pub async fn load(state: &ChatState) -> Vec<Message> {
    let Some(user_id) = state.session.user_id().await else {
        // No identity: nothing to show, and the cached history stays
        // unread so a previous user's messages never surface.
        state.conversation.write().await.clear();
        return Vec::new();
    };

    let adopted = match state.store.fetch_latest_conversation(user_id).await {
        Ok(Some(remote)) if !remote.is_empty() => {
            state.cache.set(HISTORY_KEY, &messages_to_json(&remote));
            remote
        }
        Ok(_) => cached_history(state),
        Err(e) => {
            warn!(%user_id, error = %e, "conversation: remote fetch failed, using cache");
            cached_history(state)
        }
    };

    info!(%user_id, count = adopted.len(), "conversation: loaded");
    *state.conversation.write().await = adopted.clone();
    adopted
}

/// Append one message: memory first, cache mirror, then best-effort remote
/// sync. Returns the full list after the append.
pub async fn append(state: &ChatState, message: Message) -> Vec<Message> {
    let snapshot = {
        let mut conversation = state.conversation.write().await;
        conversation.push(message);
        conversation.clone()
    };

    state.cache.set(HISTORY_KEY, &messages_to_json(&snapshot));

    if let Some(user_id) = state.session.user_id().await {
        sync_remote(state, user_id, &snapshot).await;
    }
    snapshot
}

/// Empty the conversation everywhere it lives.
pub async fn clear(state: &ChatState) {
    state.conversation.write().await.clear();
    state.cache.remove(HISTORY_KEY);

    if let Some(user_id) = state.session.user_id().await {
        // The row is emptied in place, never deleted and never created: a
        // user without a row keeps none.
        if let Err(e) = state.store.update_conversation(user_id, &[]).await {
            warn!(%user_id, error = %e, "conversation: remote clear failed");
        }
    }
    info!("conversation: cleared");
}

/// Drop the cached history and the in-memory list. Called on sign-out.
pub async fn discard_local(state: &ChatState) {
    state.cache.remove(HISTORY_KEY);
    state.conversation.write().await.clear();
}

// =============================================================================
// SYNC HELPERS
// =============================================================================

/// Check-then-act row sync: one row per user, always the whole list.
async fn sync_remote(state: &ChatState, user_id: Uuid, snapshot: &[Message]) {
    let result = match state.store.has_conversation(user_id).await {
        Ok(true) => state.store.update_conversation(user_id, snapshot).await,
        Ok(false) => state.store.insert_conversation(user_id, snapshot).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        warn!(%user_id, error = %e, "conversation: remote sync failed, cache is ahead");
    }
}

fn cached_history(state: &ChatState) -> Vec<Message> {
    match state.cache.get(HISTORY_KEY) {
        Some(blob) => messages_from_json(&blob).unwrap_or_else(|| {
            warn!("conversation: cached history malformed, starting empty");
            Vec::new()
        }),
        None => Vec::new(),
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
