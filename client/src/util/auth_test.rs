use super::*;
use session::AuthUser;

fn user() -> AuthUser {
    AuthUser {
        id: "u1".to_owned(),
        email: Some("a@b.com".to_owned()),
        email_confirmed_at: None,
        last_sign_in_at: None,
    }
}

// =============================================================================
// should_redirect_unauth
// =============================================================================

#[test]
fn redirects_when_settled_and_user_missing() {
    let state = PresenceState { user: None, loading: false, error: None };
    assert!(should_redirect_unauth(&state));
}

#[test]
fn does_not_redirect_while_loading() {
    let state = PresenceState { user: None, loading: true, error: None };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn does_not_redirect_when_user_exists() {
    let state = PresenceState { user: Some(user()), loading: false, error: None };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn does_not_redirect_on_error_state() {
    // Unknown is not signed out; the error renders instead.
    let state = PresenceState { user: None, loading: false, error: Some("boom".to_owned()) };
    assert!(!should_redirect_unauth(&state));
}

// =============================================================================
// login_path_with_return
// =============================================================================

#[test]
fn login_path_carries_the_current_location() {
    assert_eq!(login_path_with_return("/routines"), "/auth/login?redirectTo=%2Froutines");
}

#[test]
fn login_path_from_login_itself_has_no_return() {
    assert_eq!(login_path_with_return("/auth/login"), "/auth/login");
    assert_eq!(login_path_with_return(""), "/auth/login");
}

// =============================================================================
// sanitize_redirect
// =============================================================================

#[test]
fn honors_same_site_paths() {
    assert_eq!(sanitize_redirect(Some("/routines")), "/routines");
}

#[test]
fn rejects_absent_and_foreign_targets() {
    assert_eq!(sanitize_redirect(None), "/");
    assert_eq!(sanitize_redirect(Some("https://evil.example")), "/");
    assert_eq!(sanitize_redirect(Some("//evil.example")), "/");
    assert_eq!(sanitize_redirect(Some("")), "/");
}
