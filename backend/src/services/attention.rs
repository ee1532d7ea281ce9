//! Orchestration of the attention endpoints.
//!
//! Each request runs in two phases. Everything that can fail (landmark
//! detection, metric extraction) happens first, without any lock held.
//! The second phase takes the user's record lock and applies the
//! classifier and history updates, which cannot fail, so a failed request
//! never leaves partial state behind.

use std::collections::BTreeMap;

use log::debug;

use super::calibration::calibrate;
use super::classifier::{is_dark, Classification};
use super::confidence::{state_confidence, CONFIDENCE_WINDOW};
use super::metrics::{self, FrameMetrics};
use crate::db::AttentionRepository;
use crate::models::{
    AttentionCategory, AttentionState, EpochMillis, RoomId, UserAttentionRecord, UserId,
};
use crate::vision::{Frame, FrameLandmarks, LandmarkProvider, VisionError};

/// Measurements used for the confidence reported by room aggregation.
pub const ROOM_CONFIDENCE_WINDOW: usize = 5;

/// Errors raised while processing a frame.
#[derive(Debug, thiserror::Error)]
pub enum AttentionError {
    #[error(transparent)]
    Vision(#[from] VisionError),
}

pub type AttentionResult<T> = Result<T, AttentionError>;

/// A user's attention as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionSnapshot {
    pub state: AttentionState,
    pub category: AttentionCategory,
    pub state_since: EpochMillis,
    /// Share of tracked time spent attentive or active (0-100)
    pub attention_percentage: f64,
    /// Confidence as a percentage, rounded to one decimal
    pub confidence: f64,
}

impl AttentionSnapshot {
    /// Snapshot for a user the store has never seen.
    pub fn unknown(now: EpochMillis) -> Self {
        let state = AttentionState::Absent;
        Self {
            state,
            category: state.category(),
            state_since: now,
            attention_percentage: 0.0,
            confidence: 100.0,
        }
    }

    fn from_record(record: &UserAttentionRecord, confidence_window: usize, now: EpochMillis) -> Self {
        let state = record.current_state();
        let recent = record.classifier.recent_measurements(confidence_window);
        let confidence = state_confidence(&recent, state, &record.user_id);
        Self {
            state,
            category: state.category(),
            state_since: record.history.state_since().unwrap_or(now),
            attention_percentage: record.history.attentive_percentage(now),
            confidence: confidence_percent(confidence),
        }
    }
}

/// Result of processing one frame for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionReport {
    pub user_id: UserId,
    pub attention: AttentionSnapshot,
    /// How the classifier reached its state
    pub classification: Classification,
    pub timestamp: EpochMillis,
}

/// Result of an explicit calibration request.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    pub user_id: UserId,
    /// `true` when this call stored a calibration
    pub success: bool,
    pub timestamp: EpochMillis,
}

/// Attention of every requested user in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomAttention {
    pub room_id: RoomId,
    pub attention: BTreeMap<UserId, AttentionSnapshot>,
    pub timestamp: EpochMillis,
}

/// Liveness summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub timestamp: EpochMillis,
    pub users_tracked: usize,
}

/// Compute frame metrics, asking the provider for landmarks only when
/// they can matter.
///
/// Dark frames short-circuit classification, so landmarks are only needed
/// for them while calibration is still pending.
pub async fn analyze_frame(
    provider: &dyn LandmarkProvider,
    frame: &Frame,
    calibration_pending: bool,
) -> AttentionResult<FrameMetrics> {
    let (brightness, contrast) = metrics::lighting(frame);
    if is_dark(brightness) && !calibration_pending {
        debug!("dark frame (brightness {:.1}), skipping landmarks", brightness);
        return Ok(FrameMetrics {
            brightness,
            contrast,
            ..FrameMetrics::default()
        });
    }

    let landmarks: FrameLandmarks = provider.detect(frame).await?;
    Ok(metrics::extract(frame, &landmarks))
}

/// Classify one frame for `user_id` and update the user's history.
pub async fn detect_attention(
    repo: &dyn AttentionRepository,
    provider: &dyn LandmarkProvider,
    user_id: &UserId,
    frame: &Frame,
    now: EpochMillis,
) -> AttentionResult<AttentionReport> {
    let calibration_pending = repo.calibration(user_id).is_none();
    let frame_metrics = analyze_frame(provider, frame, calibration_pending).await?;

    if calibration_pending {
        calibrate(repo, user_id, &frame_metrics, now);
    }

    let handle = repo.record_or_insert(user_id, now);
    let mut record = handle.lock();
    record.last_seen = now;

    let classification = record
        .classifier
        .classify(frame_metrics.into_measurement(now), user_id);
    record.history.observe(classification.state, now);

    let attention = AttentionSnapshot::from_record(&record, CONFIDENCE_WINDOW, now);
    debug!(
        "user {}: {} ({:?}), confidence {:.1}%",
        user_id, attention.state, classification.decision, attention.confidence
    );

    Ok(AttentionReport {
        user_id: user_id.clone(),
        attention,
        classification,
        timestamp: now,
    })
}

/// Try to calibrate `user_id` from a frame.
///
/// Already-calibrated users are answered without running detection.
pub async fn calibrate_user(
    repo: &dyn AttentionRepository,
    provider: &dyn LandmarkProvider,
    user_id: &UserId,
    frame: &Frame,
    now: EpochMillis,
) -> AttentionResult<CalibrationOutcome> {
    let success = if repo.calibration(user_id).is_some() {
        false
    } else {
        let frame_metrics = analyze_frame(provider, frame, true).await?;
        calibrate(repo, user_id, &frame_metrics, now)
    };

    Ok(CalibrationOutcome {
        user_id: user_id.clone(),
        success,
        timestamp: now,
    })
}

/// Current attention of each listed user. Never creates records.
pub fn room_attention(
    repo: &dyn AttentionRepository,
    room_id: &RoomId,
    user_ids: &[UserId],
    now: EpochMillis,
) -> RoomAttention {
    let attention = user_ids
        .iter()
        .map(|user_id| {
            let snapshot = match repo.record(user_id) {
                Some(handle) => {
                    AttentionSnapshot::from_record(&handle.lock(), ROOM_CONFIDENCE_WINDOW, now)
                }
                None => AttentionSnapshot::unknown(now),
            };
            (user_id.clone(), snapshot)
        })
        .collect();

    RoomAttention {
        room_id: room_id.clone(),
        attention,
        timestamp: now,
    }
}

pub fn health(repo: &dyn AttentionRepository, now: EpochMillis) -> HealthStatus {
    HealthStatus {
        timestamp: now,
        users_tracked: repo.users_tracked(),
    }
}

/// Confidence (0-1) as a percentage rounded to one decimal.
pub fn confidence_percent(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 10.0
}

#[cfg(test)]
#[path = "attention_tests.rs"]
mod attention_tests;
