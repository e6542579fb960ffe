//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the auth gateway behind the [`AuthApi`] trait object so tests and
//! alternative providers can substitute their own implementation — the
//! gateway is constructed once in `main` and passed down, never reached for
//! through a global.

use std::sync::Arc;

use crate::config::Config;
use crate::services::gateway::AuthApi;

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Gateway to the external auth/data service.
    pub api: Arc<dyn AuthApi>,
    /// Resolved startup configuration.
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, config: Config) -> Self {
        Self { api, config: Arc::new(config) }
    }
}
