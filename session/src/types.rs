//! User identity payload and auth-change event vocabulary.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

/// The authenticated user as resolved from a valid session token by a
/// verification round-trip to the auth service.
///
/// Derived, never stored: every consumer re-fetches it from the token when
/// needed. Timestamps stay in the service's RFC 3339 string form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Unique user identifier (UUID string issued by the service).
    pub id: String,
    /// Sign-in email address.
    pub email: Option<String>,
    /// When the email address was confirmed, if it has been.
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    /// Most recent sign-in time, if known.
    #[serde(default)]
    pub last_sign_in_at: Option<String>,
}

/// Auth-state change notification delivered to subscribed handlers.
///
/// Wire names match the service's event vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    /// A session was established (sign-in or sign-up with immediate session).
    SignedIn,
    /// The session ended; absence of a user is certain, no re-verification
    /// needed.
    SignedOut,
    /// The service rotated the token pair; identity is unchanged but the
    /// stored session must be re-read.
    TokenRefreshed,
    /// Profile attributes changed; consumers should re-verify.
    UserUpdated,
}
