//! Application state for the PIA engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded law parameters and engine settings. Both are read-only
/// once loaded, so every request and every batch worker shares one copy.
#[derive(Clone)]
pub struct AppState {
    /// The loaded law directory.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a shared handle to the configuration, for work moved off
    /// the async runtime.
    pub fn shared_config(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }
}
