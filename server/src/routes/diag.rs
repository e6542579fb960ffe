//! Diagnostic routes — schema and policy probes against the data service.
//!
//! SYSTEM CONTEXT
//! ==============
//! These endpoints exist to verify that the external service's tables and
//! row-level policies behave as expected for the signed-in user. They do
//! trivial insert/select/delete sequences and report what they saw; nothing
//! else in the system depends on them.

#[cfg(test)]
#[path = "diag_test.rs"]
mod tests;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::cookies::RequestCookies;
use crate::services::session;
use crate::state::AppState;

use super::auth::require_user;
use super::settings::DEFAULT_RESET_TIME;

/// Column names of a returned row representation.
pub(crate) fn row_columns(row: &Value) -> Vec<String> {
    row.as_object().map(|o| o.keys().cloned().collect()).unwrap_or_default()
}

fn probe_failure(what: &str, error: &crate::services::gateway::ServiceError) -> Response {
    tracing::warn!(%error, what, "diagnostic probe failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": what, "details": super::auth::error_body(error) })),
    )
        .into_response()
}

/// `GET /api/test-user` — authentication state plus cookie-presence debug
/// info. Public: it reports rather than gates.
pub async fn test_user(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    let cookie_names = cookies.names();
    let has_session_token = cookie_names.iter().any(|name| name.contains("auth-token"));

    let (user, error) = match session::current_user(state.api.as_ref(), &cookies).await {
        Ok(user) => (user, None),
        Err(error) => (None, Some(error)),
    };

    let mut response = Json(json!({
        "isAuthenticated": user.is_some(),
        "user": user,
        "error": error.as_ref().map(|e| super::auth::error_body(e)),
        "debug": {
            "hasSessionToken": has_session_token,
            "sessionExists": user.is_some(),
            "userId": user.as_ref().map(|u| u.id.clone()),
            "cookieNames": cookie_names,
        },
    }))
    .into_response();
    cookies.apply(&mut response);
    response
}

/// `GET /api/test-service` — connection check: one verification round-trip.
pub async fn test_service(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    let body = match session::current_user(state.api.as_ref(), &cookies).await {
        Ok(user) => json!({ "success": true, "user": user }),
        Err(error) => json!({ "success": false, "error": super::auth::error_body(&error) }),
    };
    let mut response = Json(body).into_response();
    cookies.apply(&mut response);
    response
}

/// `GET /api/check-routines` — probe the `routines` table: insert a test
/// row, select the user's rows, delete the probe, report the shape.
pub async fn check_routines(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    let verified = match require_user(&state, &cookies).await {
        Ok(verified) => verified,
        Err(response) => return response,
    };
    let token = &verified.session.access_token;
    let user = &verified.user;

    let probe = json!({
        "user_id": user.id,
        "name": "Test Routine",
        "part_of_day": "morning",
        "day_of_week": ["monday", "wednesday", "friday"],
        "order": 1,
        "is_checked": false,
    });

    let inserted = match state.api.insert_row(token, "routines", &probe).await {
        Ok(row) => row,
        Err(error) => return probe_failure("Failed to insert test routine", &error),
    };

    let filters = vec![("user_id".to_owned(), user.id.clone())];
    let routines = match state.api.select_rows(token, "routines", &filters).await {
        Ok(rows) => rows,
        Err(error) => return probe_failure("Failed to retrieve routines", &error),
    };

    // Clean up the probe row; a failed delete only pollutes the table.
    let cleanup = vec![
        ("name".to_owned(), "Test Routine".to_owned()),
        ("user_id".to_owned(), user.id.clone()),
    ];
    if let Err(error) = state.api.delete_rows(token, "routines", &cleanup).await {
        tracing::warn!(%error, "probe cleanup failed");
    }

    let mut response = Json(json!({
        "tableExists": true,
        "columns": row_columns(&inserted),
        "sampleRow": inserted,
        "allRoutines": routines,
        "user": { "id": user.id, "email": user.email },
    }))
    .into_response();
    cookies.apply(&mut response);
    response
}

/// `GET /api/check-settings` — read the user's settings row, creating it
/// with defaults when absent.
pub async fn check_settings(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    let verified = match require_user(&state, &cookies).await {
        Ok(verified) => verified,
        Err(response) => return response,
    };
    let token = &verified.session.access_token;
    let user = &verified.user;

    let filters = vec![("user_id".to_owned(), user.id.clone())];
    let rows = match state.api.select_rows(token, "user_settings", &filters).await {
        Ok(rows) => rows,
        Err(error) => return probe_failure("Failed to retrieve settings", &error),
    };

    let body = if let Some(settings) = rows.first() {
        json!({
            "tableExists": true,
            "columns": row_columns(settings),
            "currentSettings": settings,
            "user": { "id": user.id, "email": user.email },
        })
    } else {
        // No row yet: create defaults, mirroring first-run behavior.
        let defaults = json!({ "user_id": user.id, "reset_time": DEFAULT_RESET_TIME });
        match state.api.insert_row(token, "user_settings", &defaults).await {
            Ok(created) => json!({
                "tableExists": true,
                "columns": row_columns(&created),
                "currentSettings": created,
                "message": "Created default settings for user",
                "user": { "id": user.id, "email": user.email },
            }),
            Err(error) => return probe_failure("Failed to create default settings", &error),
        }
    };

    let mut response = Json(body).into_response();
    cookies.apply(&mut response);
    response
}
