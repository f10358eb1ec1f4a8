//! Application state for the web layer.

use std::sync::Arc;

use crate::app::AppContext;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Coordinators, sensors and services
    pub app: Arc<AppContext>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(app: Arc<AppContext>) -> Self {
        Self { app }
    }
}
