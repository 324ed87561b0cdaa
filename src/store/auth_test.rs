use super::*;

// =============================================================================
// SESSION RESPONSE PARSING
// =============================================================================

#[test]
fn parse_session_reads_identity_and_token() {
    let id = Uuid::new_v4();
    let json = format!(r#"{{"user_id": "{id}", "access_token": "tok-123"}}"#);

    let session = parse_session(&json).unwrap();
    assert_eq!(session.user_id, id);
    assert_eq!(session.access_token, "tok-123");
}

#[test]
fn parse_session_ignores_extra_fields() {
    let id = Uuid::new_v4();
    let json = format!(
        r#"{{"user_id": "{id}", "access_token": "tok", "expires_in": 3600, "refresh_token": "r"}}"#
    );
    assert!(parse_session(&json).is_ok());
}

#[test]
fn parse_session_rejects_missing_token() {
    let json = format!(r#"{{"user_id": "{}"}}"#, Uuid::new_v4());
    assert!(matches!(parse_session(&json), Err(AuthError::Decode(_))));
}

#[test]
fn parse_session_rejects_malformed_user_id() {
    let json = r#"{"user_id": "not-a-uuid", "access_token": "tok"}"#;
    assert!(matches!(parse_session(json), Err(AuthError::Decode(_))));
}

// =============================================================================
// SIGN-UP RESPONSE PARSING
// =============================================================================

#[test]
fn parse_sign_up_with_token_grants_a_session() {
    let id = Uuid::new_v4();
    let json = format!(r#"{{"user_id": "{id}", "access_token": "tok-new"}}"#);

    let session = parse_sign_up(&json).unwrap().unwrap();
    assert_eq!(session.user_id, id);
    assert_eq!(session.access_token, "tok-new");
}

#[test]
fn parse_sign_up_without_token_means_confirmation_pending() {
    let json = format!(r#"{{"user_id": "{}"}}"#, Uuid::new_v4());
    assert!(parse_sign_up(&json).unwrap().is_none());

    let json = format!(r#"{{"user_id": "{}", "access_token": null}}"#, Uuid::new_v4());
    assert!(parse_sign_up(&json).unwrap().is_none());
}

#[test]
fn parse_sign_up_rejects_non_json() {
    assert!(matches!(parse_sign_up("oops"), Err(AuthError::Decode(_))));
}
