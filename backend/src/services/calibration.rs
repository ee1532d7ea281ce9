//! Per-user lighting calibration.
//!
//! Baselines are captured once, from the first frame with a confident face,
//! and never replaced. The classifier does not read them yet.

use log::{debug, info};

use super::metrics::FrameMetrics;
use crate::db::AttentionRepository;
use crate::models::{CalibrationRecord, EpochMillis, UserId};

/// Face presence a frame must exceed to serve as a baseline.
pub const CALIBRATION_FACE_PRESENCE: f64 = 20.0;

/// Whether a frame with these metrics may be used as a baseline.
pub fn is_calibration_frame(metrics: &FrameMetrics) -> bool {
    metrics.face_presence > CALIBRATION_FACE_PRESENCE
}

/// Store a calibration for `user_id` from `metrics` unless one exists.
///
/// Returns `true` only when this call stored the record.
pub fn calibrate(
    repo: &dyn AttentionRepository,
    user_id: &UserId,
    metrics: &FrameMetrics,
    now: EpochMillis,
) -> bool {
    if repo.calibration(user_id).is_some() {
        return false;
    }
    if !is_calibration_frame(metrics) {
        debug!(
            "user {}: face presence {:.2} too low to calibrate",
            user_id, metrics.face_presence
        );
        return false;
    }

    let record = CalibrationRecord {
        brightness_baseline: metrics.brightness,
        contrast_baseline: metrics.contrast,
        captured_at: now,
    };
    let stored = repo.insert_calibration_if_absent(user_id, record);
    if stored {
        info!(
            "user {}: calibrated (brightness {:.1}, contrast {:.1})",
            user_id, record.brightness_baseline, record.contrast_baseline
        );
    }
    stored
}
