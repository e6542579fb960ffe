use super::*;
use serde_json::json;

// =============================================================================
// error_from_body — one ServiceError out of every body shape the service uses
// =============================================================================

#[test]
fn normalizes_row_api_shape() {
    let error = error_from_body(404, r#"{"code":"42P01","message":"relation \"routines\" does not exist"}"#);
    assert_eq!(error.code.as_deref(), Some("42P01"));
    assert!(error.message.contains("does not exist"));
    assert_eq!(error.status, Some(404));
    assert!(error.is_missing_table());
}

#[test]
fn normalizes_no_rows_shape() {
    let error = error_from_body(
        406,
        r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
    );
    assert_eq!(error.code.as_deref(), Some(NO_ROWS_CODE));
}

#[test]
fn normalizes_token_grant_shape() {
    let error =
        error_from_body(400, r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#);
    assert_eq!(error.code.as_deref(), Some("invalid_grant"));
    assert_eq!(error.message, "Invalid Refresh Token");
    assert!(error.is_invalid_grant());
}

#[test]
fn normalizes_auth_api_msg_shape() {
    let error = error_from_body(401, r#"{"msg":"JWT expired"}"#);
    assert_eq!(error.message, "JWT expired");
    assert!(error.is_unauthorized());
}

#[test]
fn falls_back_to_raw_body() {
    let error = error_from_body(502, "bad gateway");
    assert_eq!(error.code, None);
    assert_eq!(error.message, "bad gateway");
}

#[test]
fn falls_back_to_status_for_empty_body() {
    let error = error_from_body(503, "   ");
    assert!(error.message.contains("503"));
}

// =============================================================================
// ServiceError classification
// =============================================================================

#[test]
fn unauthorized_is_401_or_403() {
    for status in [401, 403] {
        let error = ServiceError { code: None, message: String::new(), status: Some(status) };
        assert!(error.is_unauthorized(), "{status}");
    }
    let error = ServiceError { code: None, message: String::new(), status: Some(500) };
    assert!(!error.is_unauthorized());
}

#[test]
fn transport_failure_has_no_code() {
    let error = ServiceError { code: None, message: "connection refused".to_owned(), status: None };
    assert!(!error.is_unauthorized());
    assert!(!error.is_invalid_grant());
}

// =============================================================================
// parse_sign_up — grant-shaped vs. confirmation-pending
// =============================================================================

#[test]
fn sign_up_with_immediate_session() {
    let body = json!({
        "access_token": "at",
        "refresh_token": "rt",
        "user": {"id": "u1", "email": "a@b.com"}
    });
    let outcome = parse_sign_up(&body);
    let session = outcome.session.expect("session");
    assert_eq!(session.access_token, "at");
    assert_eq!(session.refresh_token, "rt");
    assert_eq!(outcome.user.expect("user").id, "u1");
}

#[test]
fn sign_up_pending_confirmation_has_no_session() {
    let body = json!({"id": "u2", "email": "new@b.com", "email_confirmed_at": null});
    let outcome = parse_sign_up(&body);
    assert!(outcome.session.is_none());
    assert_eq!(outcome.user.expect("user").id, "u2");
}

#[test]
fn sign_up_nested_user_shape() {
    let body = json!({"user": {"id": "u3", "email": "n@b.com"}});
    let outcome = parse_sign_up(&body);
    assert!(outcome.session.is_none());
    assert_eq!(outcome.user.expect("user").id, "u3");
}

// =============================================================================
// row helpers
// =============================================================================

#[test]
fn single_row_takes_first_array_element() {
    let row = single_row(json!([{"id": 1}, {"id": 2}])).expect("row");
    assert_eq!(row["id"], 1);
}

#[test]
fn single_row_empty_array_is_none() {
    assert!(single_row(json!([])).is_none());
}

#[test]
fn single_row_passes_through_objects() {
    let row = single_row(json!({"id": 7})).expect("row");
    assert_eq!(row["id"], 7);
}

#[test]
fn eq_filters_prefix_values() {
    let filters = vec![("user_id".to_owned(), "u1".to_owned())];
    assert_eq!(
        RestAuthApi::eq_filters(&filters),
        vec![("user_id".to_owned(), "eq.u1".to_owned())]
    );
}

// =============================================================================
// endpoint construction
// =============================================================================

fn api() -> RestAuthApi {
    RestAuthApi::new(&crate::config::Config {
        service_url: "https://project.supabase.co".to_owned(),
        anon_key: "anon".to_owned(),
        port: 3000,
        cookie_secure: false,
        client_dist: "client/dist".into(),
    })
}

#[test]
fn auth_and_rest_urls() {
    let api = api();
    assert_eq!(api.auth_url("user"), "https://project.supabase.co/auth/v1/user");
    assert_eq!(api.rest_url("routines"), "https://project.supabase.co/rest/v1/routines");
}
