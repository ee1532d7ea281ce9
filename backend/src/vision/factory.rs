//! Landmark provider construction from configuration.

use std::sync::Arc;

use super::error::VisionResult;
use super::landmarks::{LandmarkProvider, NullLandmarkProvider};
use crate::config::{LandmarkProviderKind, LandmarkSettings};

/// Build the provider selected by `settings`.
pub fn provider_from_settings(settings: &LandmarkSettings) -> VisionResult<Arc<dyn LandmarkProvider>> {
    match settings.provider {
        LandmarkProviderKind::None => Ok(Arc::new(NullLandmarkProvider)),
        LandmarkProviderKind::Remote => remote(settings),
    }
}

#[cfg(feature = "remote-landmarks")]
fn remote(settings: &LandmarkSettings) -> VisionResult<Arc<dyn LandmarkProvider>> {
    use super::error::VisionError;
    use super::remote::RemoteLandmarkProvider;

    let endpoint = settings
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| VisionError::provider("remote", "no endpoint configured"))?;
    Ok(Arc::new(RemoteLandmarkProvider::new(endpoint, settings.timeout())?))
}

#[cfg(not(feature = "remote-landmarks"))]
fn remote(_settings: &LandmarkSettings) -> VisionResult<Arc<dyn LandmarkProvider>> {
    Err(super::error::VisionError::provider(
        "remote",
        "built without the remote-landmarks feature",
    ))
}
