//! Cookie capability interface shared by every execution context.
//!
//! ARCHITECTURE
//! ============
//! Three contexts touch the session cookie: the browser (`document.cookie`),
//! a single-request server handler (immutable request snapshot, pending
//! response writes), and the request-interception gate (incoming request
//! reads, outgoing response writes). All three implement this one trait so
//! the gateway and the synchronization core are written once against it.
//!
//! Deletion everywhere is the same convention: set an empty value with
//! max-age zero. The default [`CookieStore::remove`] encodes that, so a
//! context only has to implement `get` and `set`.

#[cfg(test)]
#[path = "cookie_test.rs"]
mod tests;

/// Name of the session-token cookie. Fixed and opaque to the application;
/// every context reads and writes exactly this name.
pub const SESSION_COOKIE: &str = "sb-routineo-auth-token";

/// Default session cookie lifetime: seven days.
pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Attributes applied when writing a cookie. Only the attributes the
/// session protocol actually uses; per-context policy (Secure, SameSite)
/// stays inside the context's own implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie path scope.
    pub path: String,
    /// Lifetime in seconds. `None` means session-scoped (until the browser
    /// closes); implementations may substitute their own default.
    pub max_age_secs: Option<i64>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self { path: "/".to_owned(), max_age_secs: None }
    }
}

impl CookieOptions {
    /// Options for establishing a session cookie: root path, default lifetime.
    #[must_use]
    pub fn session() -> Self {
        Self { path: "/".to_owned(), max_age_secs: Some(DEFAULT_MAX_AGE_SECS) }
    }

    /// Options for the uniform removal convention: expires immediately.
    #[must_use]
    pub fn removal() -> Self {
        Self { path: "/".to_owned(), max_age_secs: Some(0) }
    }
}

/// Read/write/delete access to a named cookie within one execution context.
///
/// A missing cookie resolves to `None` — callers treat that as "no active
/// session", never as an error. No method reports failure; a context that
/// cannot write (e.g. a non-browser build of the client) no-ops instead.
pub trait CookieStore: Send + Sync {
    /// Current value of the named cookie, if present.
    fn get(&self, name: &str) -> Option<String>;

    /// Write the named cookie with the given attributes.
    fn set(&self, name: &str, value: &str, options: &CookieOptions);

    /// Delete the named cookie. Idempotent: removing an absent cookie is a
    /// no-op that leaves it absent.
    fn remove(&self, name: &str) {
        self.set(name, "", &CookieOptions::removal());
    }
}
