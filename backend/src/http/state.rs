//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::AttentionRepository;
use crate::vision::LandmarkProvider;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Attention and calibration records
    pub repository: Arc<dyn AttentionRepository>,
    /// Face, mesh and pose detection
    pub landmarks: Arc<dyn LandmarkProvider>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn AttentionRepository>,
        landmarks: Arc<dyn LandmarkProvider>,
    ) -> Self {
        Self {
            repository,
            landmarks,
        }
    }
}
