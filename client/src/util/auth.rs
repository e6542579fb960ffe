//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components apply identical unauthenticated redirect behavior: once
//! presence has settled signed-out, navigate to the login page carrying the
//! current path so the login flow can return here afterward.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::presence::PresenceState;

/// Whether a settled presence state calls for the login redirect. An error
/// state does not: unknown is rendered, not redirected.
#[must_use]
pub fn should_redirect_unauth(state: &PresenceState) -> bool {
    !state.loading && state.error.is_none() && state.user.is_none()
}

/// Login path carrying the current location as `redirectTo`.
#[must_use]
pub fn login_path_with_return(current_path: &str) -> String {
    if current_path.is_empty() || current_path == "/auth/login" {
        return "/auth/login".to_owned();
    }
    format!("/auth/login?redirectTo={}", urlencoding::encode(current_path))
}

/// Where to navigate after a successful sign-in. Only same-site paths are
/// honored; anything else falls back to the home page.
#[must_use]
pub fn sanitize_redirect(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => "/".to_owned(),
    }
}

/// Redirect to the login page whenever presence has settled signed-out.
pub fn install_unauth_redirect<F>(presence: RwSignal<PresenceState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let state = presence.get();
        if should_redirect_unauth(&state) {
            let target = login_path_with_return(&current_path());
            navigate(&target, NavigateOptions::default());
        }
    });
}

fn current_path() -> String {
    #[cfg(feature = "csr")]
    {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default()
    }
    #[cfg(not(feature = "csr"))]
    {
        String::new()
    }
}
