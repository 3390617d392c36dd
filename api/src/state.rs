//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.
//! Suriview keeps no mutable aggregate state between requests: every
//! aggregate endpoint re-reads its window from disk, so the state is just
//! the immutable configuration describing where the engine's artifacts
//! live.

use std::sync::Arc;

use crate::config::Config;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
}

impl AppState {
    /// Creates a new application state from the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
