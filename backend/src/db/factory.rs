//! Repository factory for dependency injection.

use std::sync::Arc;

use log::info;

use super::eviction::IdleTimeout;
use super::repositories::LocalRepository;
use super::repository::AttentionRepository;
use crate::config::StoreSettings;

/// Builds repository instances from configuration.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// In-memory repository that keeps records for the process lifetime.
    pub fn create_local() -> Arc<dyn AttentionRepository> {
        Arc::new(LocalRepository::new())
    }

    /// In-memory repository with the eviction policy described by `settings`.
    pub fn from_settings(settings: &StoreSettings) -> Arc<dyn AttentionRepository> {
        match settings.idle_ttl() {
            Some(ttl) => {
                info!("attention records expire after {}s idle", ttl.as_secs());
                Arc::new(LocalRepository::with_eviction(IdleTimeout::new(ttl)))
            }
            None => Self::create_local(),
        }
    }
}
