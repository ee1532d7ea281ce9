//! Landmark provider backed by a sidecar vision service.
//!
//! The sidecar receives `{"image": "<base64>"}` and answers with a
//! [`FrameLandmarks`] JSON document.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;

use super::error::{VisionError, VisionResult};
use super::frame::Frame;
use super::landmarks::{FrameLandmarks, LandmarkProvider};

const PROVIDER_NAME: &str = "remote";

#[derive(Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
}

/// HTTP client for the vision sidecar.
#[derive(Debug, Clone)]
pub struct RemoteLandmarkProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteLandmarkProvider {
    /// Create a provider posting to `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> VisionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::provider(PROVIDER_NAME, e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LandmarkProvider for RemoteLandmarkProvider {
    async fn detect(&self, frame: &Frame) -> VisionResult<FrameLandmarks> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(frame.bytes());
        let response = self
            .client
            .post(&self.endpoint)
            .json(&DetectRequest { image: &encoded })
            .send()
            .await
            .map_err(|e| VisionError::provider(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::provider(
                PROVIDER_NAME,
                format!("sidecar returned {}: {}", status, body),
            ));
        }

        response
            .json::<FrameLandmarks>()
            .await
            .map_err(|e| VisionError::provider(PROVIDER_NAME, format!("invalid response: {}", e)))
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
