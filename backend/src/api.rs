//! Public API surface of the attention backend.
//!
//! Consolidates the types that appear on the wire so clients of the library
//! (and the HTTP layer) have one import path.

pub use crate::models::{
    AttentionCategory, AttentionState, CalibrationRecord, EpochMillis, Measurement, RoomId,
    StateHistoryEntry, UserId,
};
pub use crate::services::{
    AttentionReport, AttentionSnapshot, CalibrationOutcome, Classification, Decision,
    FrameMetrics, HealthStatus, RoomAttention,
};
pub use crate::vision::{FaceDetection, FrameLandmarks, Landmark, RelativeBoundingBox};

#[cfg(feature = "http-server")]
pub use crate::http::dto::{
    CalibrateResponse, DetectAttentionResponse, FrameRequest, HealthResponse,
    RoomAttentionRequest, RoomAttentionResponse, UserAttentionDto,
};

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
