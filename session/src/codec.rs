//! Session-token cookie codec.
//!
//! DESIGN
//! ======
//! The service issues an access token and a rotating refresh token; both
//! travel together in a single cookie so the contexts stay in agreement
//! with one write. The pair is serialized as JSON and base64url-encoded to
//! keep the value cookie-safe. Cookie adapters never look inside the value;
//! only the gateway ends encode and decode it.

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Token pair proving an authenticated identity, as issued by the auth
/// service on sign-in, sign-up, and refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Short-lived bearer token presented on verification calls.
    pub access_token: String,
    /// Long-lived token exchanged for a new pair when the access token
    /// expires. Rotates on every refresh.
    pub refresh_token: String,
}

/// Error returned by [`decode_session`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The cookie value is not valid base64url.
    #[error("session cookie is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes are not valid UTF-8.
    #[error("session cookie payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The decoded payload is not a valid token pair.
    #[error("session cookie payload is not a valid token pair: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a token pair into a cookie-safe opaque string.
#[must_use]
pub fn encode_session(session: &AuthSession) -> String {
    let json = serde_json::to_string(session).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a cookie value back into a token pair.
///
/// # Errors
///
/// Returns a [`CodecError`] when the value is not base64url, not UTF-8, or
/// not a serialized token pair. Callers treat any of these as "no active
/// session" and remove the cookie rather than surfacing the failure.
pub fn decode_session(value: &str) -> Result<AuthSession, CodecError> {
    let bytes = URL_SAFE_NO_PAD.decode(value.as_bytes())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}
