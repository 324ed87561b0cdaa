use std::sync::Arc;

use super::*;

struct NoTokens;

#[async_trait::async_trait]
impl TokenSource for NoTokens {
    async fn access_token(&self) -> Option<String> {
        None
    }
}

fn config(base_url: &str) -> StoreConfig {
    StoreConfig {
        base_url: base_url.to_string(),
        api_key: None,
        request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
    }
}

// =============================================================================
// URL LAYOUT
// =============================================================================

#[test]
fn user_url_nests_resource_under_user() {
    let store = HttpStore::new(&config("https://store.example.com"), Arc::new(NoTokens)).unwrap();
    let id = Uuid::nil();
    assert_eq!(
        store.user_url(id, "settings"),
        format!("https://store.example.com/rest/v1/users/{id}/settings")
    );
    assert_eq!(
        store.user_url(id, "conversation"),
        format!("https://store.example.com/rest/v1/users/{id}/conversation")
    );
}

// =============================================================================
// STATUS HANDLING
// =============================================================================

#[test]
fn expect_success_accepts_the_2xx_range_only() {
    assert!(HttpStore::expect_success(200, String::new()).is_ok());
    assert!(HttpStore::expect_success(204, String::new()).is_ok());
    assert!(HttpStore::expect_success(299, String::new()).is_ok());

    for status in [199, 300, 404, 500] {
        let err = HttpStore::expect_success(status, "boom".to_string()).unwrap_err();
        assert!(matches!(err, StoreError::Response { status: s, .. } if s == status));
    }
}

// =============================================================================
// CONFIG FROM ENV
// =============================================================================

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_store_env() {
    unsafe {
        std::env::remove_var("BUNGPUI_STORE_URL");
        std::env::remove_var("BUNGPUI_STORE_API_KEY");
        std::env::remove_var("STORE_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("STORE_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn config_from_env_requires_the_base_url() {
    unsafe { clear_store_env() };
    assert!(StoreConfig::from_env().is_none());
}

#[test]
fn config_from_env_applies_defaults_and_trims_trailing_slash() {
    unsafe {
        clear_store_env();
        std::env::set_var("BUNGPUI_STORE_URL", "https://store.example.com/");
    }

    let config = StoreConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://store.example.com");
    assert!(config.api_key.is_none());
    assert_eq!(config.request_timeout_secs, 10);
    assert_eq!(config.connect_timeout_secs, 5);

    unsafe { clear_store_env() };
}

#[test]
fn config_from_env_reads_overrides() {
    unsafe {
        clear_store_env();
        std::env::set_var("BUNGPUI_STORE_URL", "https://store.example.com");
        std::env::set_var("BUNGPUI_STORE_API_KEY", "svc-key");
        std::env::set_var("STORE_REQUEST_TIMEOUT_SECS", "30");
        std::env::set_var("STORE_CONNECT_TIMEOUT_SECS", "not a number");
    }

    let config = StoreConfig::from_env().unwrap();
    assert_eq!(config.api_key.as_deref(), Some("svc-key"));
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.connect_timeout_secs, 5);

    unsafe { clear_store_env() };
}
