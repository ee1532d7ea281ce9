//! Confidence scoring for a classified attention state.

use log::debug;

use crate::models::{AttentionState, Measurement, UserId};

/// Number of most recent measurements the score is computed from.
pub const CONFIDENCE_WINDOW: usize = 3;
/// Confidence reported until enough measurements exist.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;
/// Consistency used when the spread of a series cannot be computed.
const FALLBACK_CONSISTENCY: f64 = 0.5;

const EYE_WEIGHT: f64 = 0.6;
const FACE_WEIGHT: f64 = 0.4;

/// Confidence (0-1) that `state` is right, judged from how consistent the
/// given measurements are.
///
/// Callers pass the most recent measurements (oldest first). Fewer than
/// [`CONFIDENCE_WINDOW`] measurements yield [`DEFAULT_CONFIDENCE`].
pub fn state_confidence(measurements: &[Measurement], state: AttentionState, user_id: &UserId) -> f64 {
    if measurements.len() < CONFIDENCE_WINDOW {
        return DEFAULT_CONFIDENCE;
    }

    let eye: Vec<f64> = measurements.iter().map(|m| m.eye_openness).collect();
    let face: Vec<f64> = measurements.iter().map(|m| m.face_presence).collect();

    let (eye_consistency, face_consistency) = match (consistency(&eye), consistency(&face)) {
        (Some(eye), Some(face)) => (eye, face),
        _ => (FALLBACK_CONSISTENCY, FALLBACK_CONSISTENCY),
    };

    let mut confidence = EYE_WEIGHT * eye_consistency + FACE_WEIGHT * face_consistency;

    match state {
        AttentionState::Absent if mean(&face) < 5.0 => confidence = confidence.max(0.9),
        AttentionState::Darkness => confidence = confidence.max(0.95),
        AttentionState::Attentive if mean(&eye) > 30.0 => confidence = confidence.max(0.8),
        _ => {}
    }

    debug!(
        "confidence for user {} in state {}: eye consistency {:.2}, face consistency {:.2} -> {:.2}",
        user_id, state, eye_consistency, face_consistency, confidence
    );

    confidence.min(1.0)
}

/// `1 - min(1, stdev / max(1, mean))`, or `None` for a degenerate series.
fn consistency(values: &[f64]) -> Option<f64> {
    let sd = population_std_dev(values)?;
    Some(1.0 - (sd / mean(values).max(1.0)).min(1.0))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    let sd = variance.sqrt();
    sd.is_finite().then_some(sd)
}
