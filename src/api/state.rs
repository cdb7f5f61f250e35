//! Application state for the API server

use crate::{Config, Dispatcher};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone); provides access to the
/// dispatcher and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The task dispatcher
    pub dispatcher: Arc<Dispatcher>,

    /// Configuration (read access)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(dispatcher: Arc<Dispatcher>, config: Arc<Config>) -> Self {
        Self { dispatcher, config }
    }
}
