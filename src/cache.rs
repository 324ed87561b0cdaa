//! Local cache — synchronous string key/value storage on disk.
//!
//! DESIGN
//! ======
//! Mirrors the platform local-storage contract the app is built against:
//! synchronous get/set/remove of small JSON strings. `FsCache` keeps one
//! file per key under a dot directory. All I/O failures are absorbed here
//! by policy — a failed read is a miss, a failed write or remove is a
//! warning — so callers never branch on cache errors. Decoding whatever
//! was stored is the callers' concern.
//!
//! Key ownership is disjoint: the settings resolver owns [`SETTINGS_KEY`],
//! the conversation synchronizer owns [`HISTORY_KEY`]. Nothing else writes
//! the cache, which lets sign-out invalidation stay per-owner.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

pub const SETTINGS_KEY: &str = "settings";
pub const HISTORY_KEY: &str = "history";

const DEFAULT_CACHE_DIR: &str = ".bungpui";

// =============================================================================
// TRAIT
// =============================================================================

/// Synchronous device-local key/value store. Infallible at the surface:
/// implementations absorb their own I/O failures.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// FILE-BACKED IMPLEMENTATION
// =============================================================================

/// One file per key under a cache directory, created lazily on first write.
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from `BUNGPUI_CACHE_DIR`, defaulting to `.bungpui`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var("BUNGPUI_CACHE_DIR").unwrap_or_else(|_| DEFAULT_CACHE_DIR.into()))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalCache for FsCache {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(error = %e, dir = %self.dir.display(), "cache: directory create failed; value not stored");
            return;
        }
        if let Err(e) = fs::write(self.path_for(key), value) {
            warn!(error = %e, key, "cache: write failed; value not stored");
        }
    }

    fn remove(&self, key: &str) {
        // Removing an absent key is a no-op, matching local-storage semantics.
        if let Err(e) = fs::remove_file(self.path_for(key)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, key, "cache: remove failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
