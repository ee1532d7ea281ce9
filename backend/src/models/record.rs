//! Per-user records held by the attention store.

use serde::{Deserialize, Serialize};

use super::attention::{AttentionState, UserId};
use super::time::EpochMillis;
use crate::services::classifier::TemporalClassifier;
use crate::services::history::AttentionHistory;

/// Metrics extracted from one frame.
///
/// Immutable once created; appended to the owner's rolling measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Mean grayscale luminance (0-255)
    pub brightness: f64,
    /// Population stdev of the grayscale histogram
    pub contrast: f64,
    /// Face presence score (0-100)
    pub face_presence: f64,
    /// Eye openness score (0-100)
    pub eye_openness: f64,
    /// Head looking score (0-1)
    pub looking_score: f64,
    pub timestamp: EpochMillis,
}

/// A completed stay in one state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateHistoryEntry {
    pub state: AttentionState,
    pub start_time: EpochMillis,
    pub end_time: EpochMillis,
    pub duration_seconds: f64,
}

/// Baseline lighting captured on the first sufficiently confident frame.
///
/// Stored for forward compatibility; the classifier does not read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub brightness_baseline: f64,
    pub contrast_baseline: f64,
    pub captured_at: EpochMillis,
}

/// Everything the service remembers about one user.
///
/// Created lazily on the first successful detection for a user id.
#[derive(Debug, Clone)]
pub struct UserAttentionRecord {
    pub user_id: UserId,
    /// Rolling measurement and classification windows
    pub classifier: TemporalClassifier,
    /// Current state, when it started, and completed stays
    pub history: AttentionHistory,
    /// Last time a frame was processed for this user (drives eviction)
    pub last_seen: EpochMillis,
}

impl UserAttentionRecord {
    pub fn new(user_id: UserId, now: EpochMillis) -> Self {
        Self {
            user_id,
            classifier: TemporalClassifier::new(),
            history: AttentionHistory::new(),
            last_seen: now,
        }
    }

    /// Current state, `absent` when nothing has been classified yet.
    pub fn current_state(&self) -> AttentionState {
        self.history.current_state().unwrap_or(AttentionState::Absent)
    }
}
