//! Settings service — resolution between defaults, cache, and remote.
//!
//! DESIGN
//! ======
//! Resolution precedence is remote over cache over defaults, per field.
//! Loads never write the cache; updates do. Every remote failure and every
//! malformed blob is absorbed here with a `warn!` — settings operations
//! never fail at the surface, they degrade toward the cache and defaults.

use tracing::{info, warn};

use crate::cache::SETTINGS_KEY;
use crate::state::ChatState;
use crate::types::{Settings, SettingsPatch};

// =============================================================================
// OPERATIONS
// =============================================================================

/// Currently resolved settings.
pub async fn current(state: &ChatState) -> Settings {
    state.settings.read().await.clone()
}

/// Resolve settings for the current identity and make them live.
///
/// Signed out: cache over defaults, the store is not queried. Signed in:
/// a found remote row wins outright; a missing row resolves locally and
/// pushes the resolved value up best-effort; a failed fetch resolves
/// locally without the write-back.
pub async fn load(state: &ChatState) -> Settings {
    let resolved = match state.session.user_id().await {
        None => cached_over_defaults(state),
        Some(user_id) => match state.store.fetch_settings(user_id).await {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                let local = cached_over_defaults(state);
                // First load for this user: create the row so other
                // devices see the same values.
                if let Err(e) = state.store.upsert_settings(user_id, &local).await {
                    warn!(%user_id, error = %e, "settings: write-back failed");
                }
                local
            }
            Err(e) => {
                warn!(%user_id, error = %e, "settings: remote fetch failed, using cache");
                cached_over_defaults(state)
            }
        },
    };

    info!(language = %resolved.preferred_language, "settings: loaded");
    *state.settings.write().await = resolved.clone();
    resolved
}

/// Merge a patch over the current settings, persist, and publish. The
/// remote upsert is best-effort; the merged value stays in effect either
/// way and the divergence heals on the next successful update.
pub async fn update(state: &ChatState, patch: &SettingsPatch) -> Settings {
    let merged = current(state).await.apply(patch);

    state.cache.set(SETTINGS_KEY, &merged.to_json());
    *state.settings.write().await = merged.clone();

    if let Some(user_id) = state.session.user_id().await {
        if let Err(e) = state.store.upsert_settings(user_id, &merged).await {
            warn!(%user_id, error = %e, "settings: remote upsert failed, cache is ahead");
        }
    }

    info!(
        language = %merged.preferred_language,
        context_window = merged.context_window,
        "settings: updated"
    );
    merged
}

/// Restore the documented defaults everywhere (a full-value update).
pub async fn reset(state: &ChatState) -> Settings {
    let defaults = Settings::default();
    update(
        state,
        &SettingsPatch {
            preferred_language: Some(defaults.preferred_language),
            show_codeblocks: Some(defaults.show_codeblocks),
            user_instruction: Some(defaults.user_instruction),
            context_window: Some(defaults.context_window),
        },
    )
    .await
}

/// Drop the cached settings and return to defaults. Called on sign-out.
pub async fn discard_local(state: &ChatState) {
    state.cache.remove(SETTINGS_KEY);
    *state.settings.write().await = Settings::default();
}

// =============================================================================
// LOCAL RESOLUTION
// =============================================================================

fn cached_over_defaults(state: &ChatState) -> Settings {
    match state.cache.get(SETTINGS_KEY) {
        Some(blob) => Settings::from_json(&blob).unwrap_or_else(|| {
            warn!("settings: cached blob malformed, using defaults");
            Settings::default()
        }),
        None => Settings::default(),
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
