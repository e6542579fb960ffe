//! Browser-side auth gateway client.
//!
//! ARCHITECTURE
//! ============
//! One `AuthClient` is constructed at app mount and passed down via context —
//! never a module-level singleton, so tests and alternative shells construct
//! their own. It exposes the auth operations plus an auth-state-change
//! subscription; every session mutation it performs emits an event to the
//! registered handlers.
//!
//! Token refreshes happen server-side during verification; the client
//! detects them by snapshotting the session cookie around the call and
//! emits `TokenRefreshed` so subscribers re-read their state.
//!
//! ERROR HANDLING
//! ==============
//! A 401 from verification means certainly signed out (`Ok(None)`); any
//! other failure is an `Err` so callers can render "unknown" distinctly
//! from "absent".

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Deserialize;

use session::{AuthEvent, AuthUser, CookieStore, SESSION_COOKIE};

use crate::cookie::BrowserCookies;

/// Outcome of a sign-up: the service may require email confirmation before
/// issuing a session.
#[derive(Clone, Debug, Deserialize)]
pub struct SignUpResponse {
    pub user: Option<AuthUser>,
    pub confirmation_required: bool,
}

#[cfg(feature = "csr")]
#[derive(Debug, Deserialize)]
struct UserResponse {
    user: Option<AuthUser>,
}

type Handler = Rc<dyn Fn(AuthEvent)>;

struct ClientInner {
    listeners: RefCell<Vec<(u64, Handler)>>,
    next_listener: Cell<u64>,
}

/// Handle returned by [`AuthClient::on_auth_state_change`]; dropping it (or
/// calling [`Subscription::unsubscribe`]) removes the registration.
pub struct Subscription {
    inner: Rc<ClientInner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner.listeners.borrow_mut().retain(|(id, _)| *id != self.id);
    }
}

/// Browser-side client for the auth endpoints.
#[derive(Clone)]
pub struct AuthClient {
    inner: Rc<ClientInner>,
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ClientInner {
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Register a handler for auth-state changes. The returned subscription
    /// must be dropped on teardown or the handler leaks for the client's
    /// lifetime.
    pub fn on_auth_state_change(&self, handler: impl Fn(AuthEvent) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(handler)));
        Subscription { inner: Rc::clone(&self.inner), id }
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        // Snapshot so a handler that subscribes or unsubscribes mid-emit
        // cannot invalidate the iteration.
        let handlers: Vec<Handler> =
            self.inner.listeners.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            handler(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Verification round-trip. `Ok(None)` is certainly signed out; `Err`
    /// means the answer is unknown.
    pub async fn get_current_user(&self) -> Result<Option<AuthUser>, String> {
        let before = BrowserCookies.get(SESSION_COOKIE);
        let result = fetch_current_user().await;
        if result.is_ok() {
            let after = BrowserCookies.get(SESSION_COOKIE);
            if token_was_refreshed(before.as_deref(), after.as_deref()) {
                self.emit(AuthEvent::TokenRefreshed);
            }
        }
        result
    }

    /// Password sign-in. The server establishes the session cookie on the
    /// response; a `SignedIn` event follows on success.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<AuthUser>, String> {
        let user = post_credentials("/api/auth/login", email, password).await?;
        self.emit(AuthEvent::SignedIn);
        Ok(user)
    }

    /// Register an account. Emits `SignedIn` only when a session was issued
    /// immediately (no confirmation step pending).
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, String> {
        let response = post_sign_up(email, password).await?;
        if !response.confirmation_required {
            self.emit(AuthEvent::SignedIn);
        }
        Ok(response)
    }

    /// Sign out: revoke server-side, clear the local cookie, notify.
    pub async fn sign_out(&self) -> Result<(), String> {
        post_logout().await?;
        // The server's removal cookie does the real work; clearing locally
        // keeps the browser context agreeable without waiting for it.
        BrowserCookies.remove(SESSION_COOKIE);
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }
}

/// A refresh happened when an existing session cookie changed value. A
/// cookie appearing or disappearing is sign-in/sign-out, reported elsewhere.
pub(crate) fn token_was_refreshed(before: Option<&str>, after: Option<&str>) -> bool {
    matches!((before, after), (Some(b), Some(a)) if b != a)
}

/// Extract a display message from an error response body.
#[cfg(any(test, feature = "csr"))]
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| format!("request failed: {status}"), str::to_owned)
}

// =============================================================================
// TRANSPORT
// =============================================================================

async fn fetch_current_user() -> Result<Option<AuthUser>, String> {
    #[cfg(feature = "csr")]
    {
        let response = gloo_net::http::Request::get("/api/auth/me")
            .send()
            .await
            .map_err(|e| e.to_string())?;
        match response.status() {
            200 => {
                let body: UserResponse = response.json().await.map_err(|e| e.to_string())?;
                Ok(body.user)
            }
            401 => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(error_message(status, &body))
            }
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        Ok(None)
    }
}

#[cfg(feature = "csr")]
async fn post_json(
    url: &str,
    payload: &serde_json::Value,
) -> Result<gloo_net::http::Response, String> {
    let response = gloo_net::http::Request::post(url)
        .json(payload)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.ok() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(error_message(status, &body))
    }
}

async fn post_credentials(
    url: &str,
    email: &str,
    password: &str,
) -> Result<Option<AuthUser>, String> {
    #[cfg(feature = "csr")]
    {
        let payload = serde_json::json!({ "email": email, "password": password });
        let response = post_json(url, &payload).await?;
        let body: UserResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.user)
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (url, email, password);
        Err("not available outside the browser".to_owned())
    }
}

async fn post_sign_up(email: &str, password: &str) -> Result<SignUpResponse, String> {
    #[cfg(feature = "csr")]
    {
        let payload = serde_json::json!({ "email": email, "password": password });
        let response = post_json("/api/auth/signup", &payload).await?;
        response.json().await.map_err(|e| e.to_string())
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (email, password);
        Err("not available outside the browser".to_owned())
    }
}

async fn post_logout() -> Result<(), String> {
    #[cfg(feature = "csr")]
    {
        gloo_net::http::Request::post("/api/auth/logout")
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
    #[cfg(not(feature = "csr"))]
    {
        Ok(())
    }
}
