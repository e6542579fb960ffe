//! Domain services used by the HTTP routes and the access gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` talks to the external auth/data service; `session` keeps the
//! cookie-held session and the service's view of it agreeable.

pub mod gateway;
pub mod session;
