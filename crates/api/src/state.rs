//! Shared application state for the Axum API server.

use std::sync::Arc;

use hvitops_common::config::AppConfig;
use hvitops_common::store::QueueStore;

/// Application state shared across all route handlers via Axum `State`.
///
/// The store handle is the same one the delivery worker drains.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QueueStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn QueueStore>, config: AppConfig) -> Self {
        Self { store, config }
    }
}
