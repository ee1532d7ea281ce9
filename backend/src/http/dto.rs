//! Data Transfer Objects for the HTTP API.
//!
//! Request fields are optional at the serde level so that a missing field
//! is reported as `400 Missing required data` rather than a generic
//! deserialization failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::models::{AttentionCategory, AttentionState, EpochMillis, RoomId, UserId};
use crate::services::{
    AttentionReport, AttentionSnapshot, CalibrationOutcome, HealthStatus, RoomAttention,
};

/// Body of `POST /api/detect_attention` and `POST /api/calibrate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequest {
    /// Base64 image, optionally prefixed with a data-URI header
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl FrameRequest {
    /// Split into image payload and user id, rejecting missing or empty fields.
    pub fn into_parts(self) -> Result<(String, UserId), AppError> {
        match (self.image, self.user_id) {
            (Some(image), Some(user_id)) if !image.is_empty() && !user_id.as_str().is_empty() => {
                Ok((image, user_id))
            }
            _ => Err(AppError::missing_data()),
        }
    }
}

/// Body of `POST /api/room_attention`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAttentionRequest {
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub user_ids: Option<Vec<UserId>>,
}

impl RoomAttentionRequest {
    pub fn into_parts(self) -> Result<(RoomId, Vec<UserId>), AppError> {
        match (self.room_id, self.user_ids) {
            (Some(room_id), Some(user_ids)) if !room_id.as_str().is_empty() => Ok((room_id, user_ids)),
            _ => Err(AppError::missing_data()),
        }
    }
}

/// Response of `POST /api/detect_attention`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectAttentionResponse {
    pub user_id: UserId,
    pub attention_state: AttentionState,
    pub attention_category: AttentionCategory,
    pub state_since: EpochMillis,
    pub attention_percentage: f64,
    /// Percentage, one decimal
    pub confidence: f64,
    pub timestamp: EpochMillis,
}

impl From<AttentionReport> for DetectAttentionResponse {
    fn from(report: AttentionReport) -> Self {
        let attention = report.attention;
        Self {
            user_id: report.user_id,
            attention_state: attention.state,
            attention_category: attention.category,
            state_since: attention.state_since,
            attention_percentage: attention.attention_percentage,
            confidence: attention.confidence,
            timestamp: report.timestamp,
        }
    }
}

/// Response of `POST /api/calibrate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrateResponse {
    pub user_id: UserId,
    pub calibration_success: bool,
    pub timestamp: EpochMillis,
}

impl From<CalibrationOutcome> for CalibrateResponse {
    fn from(outcome: CalibrationOutcome) -> Self {
        Self {
            user_id: outcome.user_id,
            calibration_success: outcome.success,
            timestamp: outcome.timestamp,
        }
    }
}

/// One user's entry in a room response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttentionDto {
    pub attention_state: AttentionState,
    pub attention_category: AttentionCategory,
    pub state_since: EpochMillis,
    pub attention_percentage: f64,
    pub confidence: f64,
}

impl From<AttentionSnapshot> for UserAttentionDto {
    fn from(snapshot: AttentionSnapshot) -> Self {
        Self {
            attention_state: snapshot.state,
            attention_category: snapshot.category,
            state_since: snapshot.state_since,
            attention_percentage: snapshot.attention_percentage,
            confidence: snapshot.confidence,
        }
    }
}

/// Response of `POST /api/room_attention`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAttentionResponse {
    pub room_id: RoomId,
    pub attention: BTreeMap<UserId, UserAttentionDto>,
    pub timestamp: EpochMillis,
}

impl From<RoomAttention> for RoomAttentionResponse {
    fn from(room: RoomAttention) -> Self {
        Self {
            room_id: room.room_id,
            attention: room
                .attention
                .into_iter()
                .map(|(user_id, snapshot)| (user_id, snapshot.into()))
                .collect(),
            timestamp: room.timestamp,
        }
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: EpochMillis,
    pub users_tracked: usize,
}

impl From<HealthStatus> for HealthResponse {
    fn from(health: HealthStatus) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: health.timestamp,
            users_tracked: health.users_tracked,
        }
    }
}
