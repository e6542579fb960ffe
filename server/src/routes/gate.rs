//! Access gate — request-intercepting authorization check.
//!
//! ARCHITECTURE
//! ============
//! Runs as middleware ahead of every handler. Each request moves through a
//! small state machine: public paths pass untouched (no verification call at
//! all); everything else is verified against the service through the cookie
//! adapter, then either forwarded or redirected to the login page with the
//! original path attached as `redirectTo`. The gate forwards or redirects,
//! never both, and any cookie mutation the verification produced (a token
//! refresh, a cleared dead session) is drained onto whichever response goes
//! out.

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::cookies::RequestCookies;
use crate::services::gateway::{AuthApi, ServiceError};
use crate::services::session;
use crate::state::AppState;

/// Path prefixes exempt from authentication. Any request whose path starts
/// with one of these bypasses the check entirely.
pub const PUBLIC_PATHS: &[&str] = &[
    "/auth/login",
    "/auth/signup",
    "/auth-test",
    "/api/auth",
    "/api/test-user",
    "/pkg",
    "/favicon.ico",
    "/healthz",
];

/// Login path the gate redirects to on deny.
pub const LOGIN_PATH: &str = "/auth/login";

/// Whether the path is exempt from authentication. First match wins, though
/// the entries are independent exemptions so order carries no meaning.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

/// Build the deny redirect target carrying the original path.
#[must_use]
pub fn login_redirect_target(path: &str) -> String {
    format!("{LOGIN_PATH}?redirectTo={}", urlencoding::encode(path))
}

/// Terminal outcome of the gate for one request.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GateOutcome {
    /// Exempt path: forward without any verification.
    Public,
    /// Verified session: forward.
    Authenticated,
    /// No session, dead session, or verification failure: redirect.
    Denied { location: String },
}

pub(crate) async fn decide(
    api: &dyn AuthApi,
    cookies: &RequestCookies,
    path: &str,
) -> GateOutcome {
    if is_public_path(path) {
        return GateOutcome::Public;
    }
    match session::current_user(api, cookies).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = %user.id, %path, "gate: authenticated");
            GateOutcome::Authenticated
        }
        Ok(None) => GateOutcome::Denied { location: login_redirect_target(path) },
        Err(error) => {
            warn_denied(&error, path);
            GateOutcome::Denied { location: login_redirect_target(path) }
        }
    }
}

fn warn_denied(error: &ServiceError, path: &str) {
    tracing::warn!(%error, %path, "gate: verification failed, denying");
}

/// Axum middleware wrapping the whole router.
pub async fn access_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let cookies = RequestCookies::from_headers(request.headers(), state.config.cookie_secure);

    match decide(state.api.as_ref(), &cookies, &path).await {
        GateOutcome::Public => next.run(request).await,
        GateOutcome::Authenticated => {
            let mut response = next.run(request).await;
            cookies.apply(&mut response);
            response
        }
        GateOutcome::Denied { location } => {
            let mut response = Redirect::temporary(&location).into_response();
            cookies.apply(&mut response);
            response
        }
    }
}
