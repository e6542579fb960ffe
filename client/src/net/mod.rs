//! Networking: the browser-side auth gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! All HTTP goes same-origin to our server, which performs the actual
//! verification round-trips against the external service. The session
//! cookie travels automatically; mutations come back as `Set-Cookie`.

pub mod gateway;
