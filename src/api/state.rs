//! Shared application state

use std::sync::Arc;

use crate::ingest::LogController;

/// State shared by all HTTP handlers
pub struct AppState {
    pub controller: Arc<LogController>,
    pub started_at: i64,
}

impl AppState {
    pub fn new(controller: Arc<LogController>) -> Self {
        Self {
            controller,
            started_at: crate::utils::current_timestamp(),
        }
    }
}
