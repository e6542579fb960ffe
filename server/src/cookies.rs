//! Request-scoped cookie adapter for the server and gate contexts.
//!
//! ARCHITECTURE
//! ============
//! Reads come from an immutable snapshot of the incoming request's `Cookie`
//! header; writes accumulate in a pending list that the owning context
//! drains onto whichever response goes out — the handler's own response in
//! the per-request context, the forwarded or redirect response in the gate
//! context. The browser never sees a mutation except through those
//! `Set-Cookie` headers; there is no other channel back.
//!
//! The session cookie is deliberately not `HttpOnly`: the browser context
//! reads the same cookie through its own adapter, and the shared-value
//! invariant across contexts depends on that visibility.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;

use std::sync::Mutex;

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use session::{CookieOptions, CookieStore};

/// Cookie access bound to one request/response cycle.
pub struct RequestCookies {
    snapshot: CookieJar,
    pending: Mutex<Vec<Cookie<'static>>>,
    secure: bool,
}

impl RequestCookies {
    /// Snapshot the incoming request's cookies.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        Self {
            snapshot: CookieJar::from_headers(headers),
            pending: Mutex::new(Vec::new()),
            secure,
        }
    }

    /// Names of all cookies present on the request, for diagnostics.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.snapshot.iter().map(|c| c.name().to_owned()).collect()
    }

    /// Drain pending mutations onto the outgoing response as `Set-Cookie`
    /// headers. Appends, so multiple writes to distinct names all survive.
    pub fn apply(&self, response: &mut Response) {
        let pending = self.pending.lock().expect("pending cookie lock poisoned");
        for cookie in pending.iter() {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
    }

    fn build_cookie(&self, name: &str, value: &str, options: &CookieOptions) -> Cookie<'static> {
        let mut builder = Cookie::build((name.to_owned(), value.to_owned()))
            .path(options.path.clone())
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .http_only(false);
        if let Some(secs) = options.max_age_secs {
            builder = builder.max_age(Duration::seconds(secs));
        }
        builder.build()
    }
}

impl CookieStore for RequestCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.snapshot.get(name).map(|c| c.value().to_owned())
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        let cookie = self.build_cookie(name, value, options);
        self.pending.lock().expect("pending cookie lock poisoned").push(cookie);
    }
}
