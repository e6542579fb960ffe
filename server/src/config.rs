//! Startup configuration loaded from the environment.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth service coordinates are required; a missing value aborts
//! initialization before any request is served. Everything else has a
//! local-development default.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

/// Fatal configuration failure raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration, resolved once in `main` and shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the external auth/data service, without a trailing slash.
    pub service_url: String,
    /// Public (anon) API key presented on every service call.
    pub anon_key: String,
    /// HTTP listen port.
    pub port: u16,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// Directory of built client assets served at the root.
    pub client_dist: PathBuf,
}

impl Config {
    /// Load from `SUPABASE_URL`, `SUPABASE_ANON_KEY`, and the optional
    /// `PORT`, `COOKIE_SECURE`, `CLIENT_DIST`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is absent or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let service_url = required("SUPABASE_URL")?.trim_end_matches('/').to_owned();
        let anon_key = required("SUPABASE_ANON_KEY")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            Err(_) => 3000,
        };

        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or(false);

        let client_dist = std::env::var("CLIENT_DIST")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("client/dist"));

        Ok(Self { service_url, anon_key, port, cookie_secure, client_dist })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Parse a boolean environment variable, accepting the usual spellings.
pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}
