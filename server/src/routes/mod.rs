//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the auth API, the diagnostic probes, and the
//! built client assets. The access gate wraps the whole thing so it runs
//! ahead of every handler, including the static fallback.

pub mod auth;
pub mod diag;
pub mod gate;
pub mod settings;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with the gate wrapped around everything.
pub fn app(state: AppState) -> Router {
    let dist = &state.config.client_dist;
    // Client-routed paths fall back to the SPA shell.
    let assets = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/settings",
            get(settings::get_settings).patch(settings::update_settings),
        )
        .route("/api/test-user", get(diag::test_user))
        .route("/api/test-service", get(diag::test_service))
        .route("/api/check-routines", get(diag::check_routines))
        .route("/api/check-settings", get(diag::check_settings))
        .fallback_service(assets)
        .layer(middleware::from_fn_with_state(state.clone(), gate::access_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
