//! User settings routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! A user has one `user_settings` row keyed by their id; `reset_time` is
//! the local time their daily routines reset. Rows live behind the data
//! service's row-level policies, so every call carries the verified access
//! token.

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::cookies::RequestCookies;
use crate::state::AppState;

use super::auth::require_user;

/// Reset time written when a user has no settings row yet.
pub(crate) const DEFAULT_RESET_TIME: &str = "05:00";

/// `HH:MM`, 24-hour.
pub(crate) fn valid_reset_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    let two_digit =
        |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_digit());
    if !two_digit(hours) || !two_digit(minutes) {
        return false;
    }
    hours.parse::<u8>().is_ok_and(|h| h < 24) && minutes.parse::<u8>().is_ok_and(|m| m < 60)
}

#[derive(Debug, Deserialize)]
pub struct SettingsPatch {
    pub reset_time: String,
}

/// `GET /api/settings` — the user's settings row, if one exists yet.
pub async fn get_settings(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    let verified = match require_user(&state, &cookies).await {
        Ok(verified) => verified,
        Err(response) => return response,
    };

    let filters = vec![("user_id".to_owned(), verified.user.id.clone())];
    let rows = match state
        .api
        .select_rows(&verified.session.access_token, "user_settings", &filters)
        .await
    {
        Ok(rows) => rows,
        Err(error) => {
            tracing::warn!(%error, "settings read failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Failed to retrieve settings" })),
            )
                .into_response();
        }
    };

    let mut response = Json(json!({ "settings": rows.first() })).into_response();
    cookies.apply(&mut response);
    response
}

/// `PATCH /api/settings` — set the reset time, creating the row with
/// defaults when it does not exist yet.
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<SettingsPatch>,
) -> Response {
    if !valid_reset_time(&patch.reset_time) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "reset_time must be HH:MM" })),
        )
            .into_response();
    }

    let cookies = RequestCookies::from_headers(&headers, state.config.cookie_secure);
    let verified = match require_user(&state, &cookies).await {
        Ok(verified) => verified,
        Err(response) => return response,
    };
    let token = &verified.session.access_token;
    let user_id = &verified.user.id;

    let filters = vec![("user_id".to_owned(), user_id.clone())];
    let changes = json!({ "reset_time": patch.reset_time });
    let updated = match state.api.update_rows(token, "user_settings", &filters, &changes).await {
        Ok(rows) => rows,
        Err(error) => {
            tracing::warn!(%error, "settings update failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Failed to update settings" })),
            )
                .into_response();
        }
    };

    let settings = if let Some(row) = updated.into_iter().next() {
        row
    } else {
        // First write for this user: create the row instead.
        let defaults = json!({ "user_id": user_id, "reset_time": patch.reset_time });
        match state.api.insert_row(token, "user_settings", &defaults).await {
            Ok(created) => created,
            Err(error) => {
                tracing::warn!(%error, "settings create failed");
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Failed to create settings" })),
                )
                    .into_response();
            }
        }
    };

    let mut response = Json(json!({ "settings": settings })).into_response();
    cookies.apply(&mut response);
    response
}
