//! Temporal attention classifier.
//!
//! Keeps a rolling window of recent measurements and a rolling window of
//! recent raw classifications for one user, and turns each new frame into a
//! smoothed [`AttentionState`]:
//!
//! 1. frames darker than [`DARKNESS_BRIGHTNESS`] are `darkness` and are not recorded;
//! 2. the measurement is appended to the measurement window;
//! 3. a face presence below [`ABSENT_FACE_PRESENCE`] is `absent` immediately;
//! 4. otherwise recency-weighted averages go through ordered thresholds;
//! 5. a majority over the last [`MAJORITY_WINDOW`] raw classifications wins,
//!    unless the raw state is confident enough to override it.

use log::debug;

use super::confidence::{state_confidence, CONFIDENCE_WINDOW};
use crate::models::{AttentionState, Measurement, RollingWindow, UserId};

pub const DARKNESS_BRIGHTNESS: f64 = 15.0;
pub const ABSENT_FACE_PRESENCE: f64 = 8.0;

pub const MEASUREMENT_WINDOW: usize = 10;
pub const CLASSIFICATION_WINDOW: usize = 20;
pub const MAJORITY_WINDOW: usize = 5;
pub const MAJORITY_QUORUM: usize = 3;
/// Raw classifications above this confidence override a weak majority.
pub const OVERRIDE_CONFIDENCE: f64 = 0.8;

const OLDEST_WEIGHT: f64 = 0.5;

/// Whether a frame is too dark to analyze.
pub fn is_dark(brightness: f64) -> bool {
    brightness < DARKNESS_BRIGHTNESS
}

/// Recency-weighted means over the measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedAverages {
    pub eye_openness: f64,
    pub face_presence: f64,
    pub looking_score: f64,
}

/// Why the classifier settled on its final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Frame brightness below the darkness threshold
    Darkness,
    /// Face presence below the absence threshold
    NoFace,
    /// At least [`MAJORITY_QUORUM`] of the last [`MAJORITY_WINDOW`] agree
    Majority,
    /// Raw state confident enough to override
    Confident,
    /// No quorum and low confidence: latest entry of the window
    Latest,
}

/// Outcome of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Final, smoothed state
    pub state: AttentionState,
    /// Threshold classification of this frame alone
    pub raw_state: AttentionState,
    pub decision: Decision,
    /// Confidence of the raw state (only meaningful for threshold decisions)
    pub confidence: Option<f64>,
}

/// Per-user rolling state of the classifier.
#[derive(Debug, Clone)]
pub struct TemporalClassifier {
    measurements: RollingWindow<Measurement>,
    classifications: RollingWindow<AttentionState>,
}

impl Default for TemporalClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalClassifier {
    pub fn new() -> Self {
        Self {
            measurements: RollingWindow::new(MEASUREMENT_WINDOW),
            classifications: RollingWindow::new(CLASSIFICATION_WINDOW),
        }
    }

    pub fn measurements(&self) -> &RollingWindow<Measurement> {
        &self.measurements
    }

    pub fn classifications(&self) -> &RollingWindow<AttentionState> {
        &self.classifications
    }

    /// The newest `n` measurements, oldest first.
    pub fn recent_measurements(&self, n: usize) -> Vec<Measurement> {
        self.measurements.recent_vec(n)
    }

    /// Classify one frame, updating the rolling windows.
    pub fn classify(&mut self, measurement: Measurement, user_id: &UserId) -> Classification {
        if is_dark(measurement.brightness) {
            return Classification {
                state: AttentionState::Darkness,
                raw_state: AttentionState::Darkness,
                decision: Decision::Darkness,
                confidence: None,
            };
        }

        self.measurements.push(measurement);

        if measurement.face_presence < ABSENT_FACE_PRESENCE {
            self.classifications.push(AttentionState::Absent);
            return Classification {
                state: AttentionState::Absent,
                raw_state: AttentionState::Absent,
                decision: Decision::NoFace,
                confidence: None,
            };
        }

        let averages = weighted_averages(&self.measurements);
        let raw_state = classify_averages(&averages);
        debug!(
            "user {}: avg face presence {:.2}, avg eye openness {:.2}, avg looking score {:.2} -> {}",
            user_id, averages.face_presence, averages.eye_openness, averages.looking_score, raw_state
        );

        self.classifications.push(raw_state);
        let majority = majority_state(self.classifications.recent(MAJORITY_WINDOW));

        let recent = self.recent_measurements(CONFIDENCE_WINDOW);
        let confidence = state_confidence(&recent, raw_state, user_id);

        let (state, decision) = smooth(
            raw_state,
            majority,
            confidence,
            self.classifications.last().copied(),
        );

        Classification {
            state,
            raw_state,
            decision,
            confidence: Some(confidence),
        }
    }
}

/// Weighted means with weights rising linearly from 0.5 (oldest) to 1.0 (newest).
pub fn weighted_averages(window: &RollingWindow<Measurement>) -> WeightedAverages {
    let n = window.len();
    if n == 0 {
        return WeightedAverages::default();
    }
    let span = n.saturating_sub(1).max(1) as f64;

    let mut total_weight = 0.0;
    let mut sums = WeightedAverages::default();
    for (i, m) in window.iter().enumerate() {
        let weight = OLDEST_WEIGHT + (1.0 - OLDEST_WEIGHT) * i as f64 / span;
        total_weight += weight;
        sums.eye_openness += m.eye_openness * weight;
        sums.face_presence += m.face_presence * weight;
        sums.looking_score += m.looking_score * weight;
    }

    WeightedAverages {
        eye_openness: sums.eye_openness / total_weight,
        face_presence: sums.face_presence / total_weight,
        looking_score: sums.looking_score / total_weight,
    }
}

/// Ordered threshold checks; the first match wins.
pub fn classify_averages(avg: &WeightedAverages) -> AttentionState {
    if avg.eye_openness < 5.0 {
        AttentionState::Sleeping
    } else if avg.eye_openness < 12.0 {
        AttentionState::Drowsy
    } else if avg.looking_score < 0.6 {
        AttentionState::LookingAway
    } else if avg.face_presence > 20.0 && avg.eye_openness > 20.0 && avg.looking_score > 0.8 {
        AttentionState::Attentive
    } else if avg.face_presence > 15.0 {
        AttentionState::Active
    } else {
        AttentionState::Absent
    }
}

/// Final decision from the raw state, the recent majority and the raw
/// state's confidence.
///
/// A quorum majority wins; otherwise a confident raw state; otherwise the
/// latest recorded classification, falling back to the raw state.
pub fn smooth(
    raw_state: AttentionState,
    majority: Option<(AttentionState, usize)>,
    confidence: f64,
    latest: Option<AttentionState>,
) -> (AttentionState, Decision) {
    match majority {
        Some((state, count)) if count >= MAJORITY_QUORUM => (state, Decision::Majority),
        _ if confidence > OVERRIDE_CONFIDENCE => (raw_state, Decision::Confident),
        _ => (latest.unwrap_or(raw_state), Decision::Latest),
    }
}

/// Most frequent state and its count. Ties go to the state seen first.
pub fn majority_state<'a>(
    states: impl Iterator<Item = &'a AttentionState>,
) -> Option<(AttentionState, usize)> {
    let mut counts: Vec<(AttentionState, usize)> = Vec::new();
    for state in states {
        match counts.iter_mut().find(|(s, _)| s == state) {
            Some((_, count)) => *count += 1,
            None => counts.push((*state, 1)),
        }
    }

    let mut best: Option<(AttentionState, usize)> = None;
    for (state, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((state, count));
        }
    }
    best
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod classifier_tests;
