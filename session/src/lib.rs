//! Shared session boundary for the Routineo server and client.
//!
//! This crate owns the representation of authentication state that crosses
//! execution contexts: the cookie capability interface every context
//! implements, the session-token cookie codec, the user identity payload
//! resolved from a verified token, and the auth-change event vocabulary.
//!
//! DESIGN
//! ======
//! The cookie is the only state shared between the browser, the per-request
//! server context, and the request-interception gate. Nothing here performs
//! I/O; each side supplies its own [`CookieStore`] implementation and its own
//! HTTP transport, and agrees with the others purely through these types.

pub mod codec;
pub mod cookie;
pub mod types;

pub use codec::{AuthSession, CodecError, decode_session, encode_session};
pub use cookie::{CookieOptions, CookieStore, DEFAULT_MAX_AGE_SECS, SESSION_COOKIE};
pub use types::{AuthEvent, AuthUser};
