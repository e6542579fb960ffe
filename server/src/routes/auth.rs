//! Auth routes — sign-in, sign-up, sign-out, current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! These endpoints are the browser client's path to session mutations. Every
//! cookie change travels as a `Set-Cookie` header on the handler's own
//! response; the handler context never mutates anything else.
//!
//! ERROR HANDLING
//! ==============
//! Gateway failures arrive already normalized. Rejected credentials map to
//! 401, anything that leaves the outcome unknown maps to 502 with the
//! normalized payload, so the client can tell "signed out" from "unknown".

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::cookies::RequestCookies;
use crate::services::gateway::ServiceError;
use crate::services::session::{self, Verified};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub(crate) fn error_body(error: &ServiceError) -> serde_json::Value {
    json!({ "error": error.message, "code": error.code })
}

fn service_failure(context: &str, error: &ServiceError) -> Response {
    tracing::warn!(%error, context, "auth service call failed");
    (StatusCode::BAD_GATEWAY, Json(error_body(error))).into_response()
}

/// Verify the request's session for handlers that need the user and the
/// access token; the failure response is ready to return as-is.
pub(crate) async fn require_user(
    state: &AppState,
    cookies: &RequestCookies,
) -> Result<Verified, Response> {
    match session::verified_user(state.api.as_ref(), cookies).await {
        Ok(Some(verified)) => Ok(verified),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Not authenticated",
                "message": "Please log in to access this endpoint",
            })),
        )
            .into_response()),
        Err(error) => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Authentication required",
                "details": error_body(&error),
            })),
        )
            .into_response()),
    }
}

/// `POST /api/auth/login` — password sign-in; establishes the session cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    match state.api.password_sign_in(&credentials.email, &credentials.password).await {
        Ok(grant) => {
            session::establish(&cookies, &grant.session);
            tracing::info!(email = %credentials.email, "signed in");
            let mut response = Json(json!({ "user": grant.user })).into_response();
            cookies.apply(&mut response);
            response
        }
        Err(error) if error.is_invalid_grant() => {
            (StatusCode::UNAUTHORIZED, Json(error_body(&error))).into_response()
        }
        Err(error) => service_failure("sign-in", &error),
    }
}

/// `POST /api/auth/signup` — register; establishes a session when the
/// service issues one immediately (no confirmation step).
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(credentials): Json<Credentials>,
) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    match state.api.sign_up(&credentials.email, &credentials.password).await {
        Ok(outcome) => {
            if let Some(session) = &outcome.session {
                session::establish(&cookies, session);
            }
            let mut response = Json(json!({
                "user": outcome.user,
                "confirmation_required": outcome.session.is_none(),
            }))
            .into_response();
            cookies.apply(&mut response);
            response
        }
        Err(error) if error.is_invalid_grant() => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(error_body(&error))).into_response()
        }
        Err(error) => service_failure("sign-up", &error),
    }
}

/// `POST /api/auth/logout` — revoke the session upstream (best effort) and
/// remove the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    if let Some(stored) = session::stored_session(&cookies) {
        if let Err(error) = state.api.sign_out(&stored.access_token).await {
            // Local sign-out still proceeds; the cookie is what keeps the
            // browser signed in.
            tracing::warn!(%error, "upstream sign-out failed");
        }
    }
    session::clear(&cookies);
    let mut response = StatusCode::NO_CONTENT.into_response();
    cookies.apply(&mut response);
    response
}

/// `GET /api/auth/me` — verification round-trip for the browser client.
/// 401 means certainly signed out; 502 means the answer is unknown.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    match session::current_user(state.api.as_ref(), &cookies).await {
        Ok(Some(user)) => {
            let mut response = Json(json!({ "user": user })).into_response();
            cookies.apply(&mut response);
            response
        }
        Ok(None) => {
            let mut response = (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            )
                .into_response();
            cookies.apply(&mut response);
            response
        }
        Err(error) => service_failure("verification", &error),
    }
}
