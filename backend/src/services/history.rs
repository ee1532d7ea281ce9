//! Attention history tracking.
//!
//! Records how long a user stayed in each state and derives the share of
//! time spent attentive. Stays of one second or less are not recorded.

use log::debug;

use crate::models::{AttentionState, EpochMillis, RollingWindow, StateHistoryEntry};

/// Completed stays kept per user; the oldest is dropped first.
pub const HISTORY_CAPACITY: usize = 30;
/// Stays must last longer than this to be recorded.
pub const MIN_RECORDED_SECONDS: f64 = 1.0;

/// Effect of observing a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// First state ever observed
    Started,
    /// Same state as before
    Unchanged,
    /// State changed; the previous stay was recorded
    Recorded(StateHistoryEntry),
    /// State changed; the previous stay was too short to record
    Debounced,
}

/// Current state, when it began, and recent completed stays.
#[derive(Debug, Clone)]
pub struct AttentionHistory {
    current_state: Option<AttentionState>,
    state_since: Option<EpochMillis>,
    entries: RollingWindow<StateHistoryEntry>,
}

impl Default for AttentionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl AttentionHistory {
    pub fn new() -> Self {
        Self {
            current_state: None,
            state_since: None,
            entries: RollingWindow::new(HISTORY_CAPACITY),
        }
    }

    pub fn current_state(&self) -> Option<AttentionState> {
        self.current_state
    }

    /// When the current state began; only moves on an actual state change.
    pub fn state_since(&self) -> Option<EpochMillis> {
        self.state_since
    }

    pub fn entries(&self) -> &RollingWindow<StateHistoryEntry> {
        &self.entries
    }

    /// Feed the latest classified state observed at `now`.
    pub fn observe(&mut self, state: AttentionState, now: EpochMillis) -> Transition {
        let Some(previous) = self.current_state else {
            self.current_state = Some(state);
            self.state_since = Some(now);
            return Transition::Started;
        };
        if previous == state {
            return Transition::Unchanged;
        }

        let since = self.state_since.unwrap_or(now);
        let duration_seconds = now.seconds_since(since);

        let transition = if duration_seconds > MIN_RECORDED_SECONDS {
            let entry = StateHistoryEntry {
                state: previous,
                start_time: since,
                end_time: now,
                duration_seconds,
            };
            self.entries.push(entry);
            Transition::Recorded(entry)
        } else {
            debug!(
                "dropping {:.3}s stay in {} before switching to {}",
                duration_seconds, previous, state
            );
            Transition::Debounced
        };

        self.current_state = Some(state);
        self.state_since = Some(now);
        transition
    }

    /// Seconds spent in the current state so far, clamped at zero.
    pub fn in_progress_seconds(&self, now: EpochMillis) -> f64 {
        match (self.current_state, self.state_since) {
            (Some(_), Some(since)) => now.seconds_since(since).max(0.0),
            _ => 0.0,
        }
    }

    /// Percentage (0-100) of recorded plus in-progress time spent attentive
    /// or active. Zero when no time has elapsed.
    pub fn attentive_percentage(&self, now: EpochMillis) -> f64 {
        let mut total = 0.0;
        let mut attentive = 0.0;
        for entry in self.entries.iter() {
            let duration = entry.duration_seconds.max(0.0);
            total += duration;
            if entry.state.counts_as_attentive() {
                attentive += duration;
            }
        }

        let current = self.in_progress_seconds(now);
        total += current;
        if self.current_state.is_some_and(|s| s.counts_as_attentive()) {
            attentive += current;
        }

        if total > 0.0 {
            attentive / total * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttentionState::*;

    fn at(seconds: f64) -> EpochMillis {
        EpochMillis::new(1_700_000_000_000 + (seconds * 1000.0) as i64)
    }

    #[test]
    fn test_first_observation_starts_without_entry() {
        let mut history = AttentionHistory::new();
        assert_eq!(history.observe(Attentive, at(0.0)), Transition::Started);
        assert_eq!(history.current_state(), Some(Attentive));
        assert_eq!(history.state_since(), Some(at(0.0)));
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_same_state_does_not_move_state_since() {
        let mut history = AttentionHistory::new();
        history.observe(Attentive, at(0.0));
        assert_eq!(history.observe(Attentive, at(5.0)), Transition::Unchanged);
        assert_eq!(history.state_since(), Some(at(0.0)));
    }

    #[test]
    fn test_change_after_long_stay_is_recorded() {
        let mut history = AttentionHistory::new();
        history.observe(Attentive, at(0.0));
        let transition = history.observe(Drowsy, at(4.0));

        let expected = StateHistoryEntry {
            state: Attentive,
            start_time: at(0.0),
            end_time: at(4.0),
            duration_seconds: 4.0,
        };
        assert_eq!(transition, Transition::Recorded(expected));
        assert_eq!(history.entries().last(), Some(&expected));
        assert_eq!(history.current_state(), Some(Drowsy));
        assert_eq!(history.state_since(), Some(at(4.0)));
    }

    #[test]
    fn test_flicker_of_one_second_is_debounced() {
        let mut history = AttentionHistory::new();
        history.observe(Attentive, at(0.0));
        assert_eq!(history.observe(LookingAway, at(1.0)), Transition::Debounced);
        assert!(history.entries().is_empty());
        // state and timestamp still move
        assert_eq!(history.current_state(), Some(LookingAway));
        assert_eq!(history.state_since(), Some(at(1.0)));
    }

    #[test]
    fn test_history_capped_at_thirty_entries() {
        let mut history = AttentionHistory::new();
        let states = [Attentive, Drowsy];
        for i in 0..40 {
            history.observe(states[i % 2], at(i as f64 * 2.0));
        }
        assert_eq!(history.entries().len(), HISTORY_CAPACITY);
        // oldest surviving entry started at t = (39 - 30) * 2
        assert_eq!(history.entries().iter().next().map(|e| e.start_time), Some(at(18.0)));
    }

    #[test]
    fn test_percentage_zero_without_elapsed_time() {
        let mut history = AttentionHistory::new();
        assert_eq!(history.attentive_percentage(at(0.0)), 0.0);
        history.observe(Attentive, at(0.0));
        assert_eq!(history.attentive_percentage(at(0.0)), 0.0);
    }

    #[test]
    fn test_percentage_all_attentive_is_hundred() {
        let mut history = AttentionHistory::new();
        history.observe(Attentive, at(0.0));
        history.observe(Active, at(10.0));
        history.observe(Attentive, at(15.0));
        assert_eq!(history.attentive_percentage(at(20.0)), 100.0);
    }

    #[test]
    fn test_percentage_mixes_recorded_and_in_progress() {
        let mut history = AttentionHistory::new();
        history.observe(Attentive, at(0.0));
        history.observe(Sleeping, at(6.0));
        // 6s attentive recorded, 4s sleeping in progress
        assert!((history.attentive_percentage(at(10.0)) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_clamps_clock_skew() {
        let mut history = AttentionHistory::new();
        history.observe(Attentive, at(0.0));
        history.observe(Drowsy, at(5.0));
        // read at a time before state_since: in-progress counts as zero
        assert_eq!(history.in_progress_seconds(at(3.0)), 0.0);
        assert_eq!(history.attentive_percentage(at(3.0)), 100.0);
    }
}
