//! Application state management

use crate::inference::InferenceService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Read-only after construction; handlers never need a lock.
pub struct AppState {
    pub config: ServerConfig,
    pub service: Arc<InferenceService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, service: InferenceService) -> Self {
        Self::with_shared(config, Arc::new(service))
    }

    pub fn with_shared(config: ServerConfig, service: Arc<InferenceService>) -> Self {
        Self {
            config,
            service,
            started_at: Utc::now(),
        }
    }
}
