//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::PayrollConfig;

/// Shared application state.
///
/// Holds the server's base configuration; requests may layer their own
/// overrides on top of it.
#[derive(Clone)]
pub struct AppState {
    config: Arc<PayrollConfig>,
}

impl AppState {
    /// Creates a new application state with the given base configuration.
    pub fn new(config: PayrollConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the base configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }
}
