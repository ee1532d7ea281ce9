//! Discrete attention states and their coarse categories.

use serde::{Deserialize, Serialize};

crate::define_string_id!(UserId);
crate::define_string_id!(RoomId);

/// Attention state produced by the classifier for one frame.
///
/// There is no initial or terminal state; a state is recomputed for every
/// request. Serialized in `snake_case` (`"looking_away"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionState {
    Attentive,
    Active,
    LookingAway,
    Drowsy,
    Sleeping,
    Absent,
    Darkness,
}

impl AttentionState {
    pub const ALL: [AttentionState; 7] = [
        AttentionState::Attentive,
        AttentionState::Active,
        AttentionState::LookingAway,
        AttentionState::Drowsy,
        AttentionState::Sleeping,
        AttentionState::Absent,
        AttentionState::Darkness,
    ];

    /// Wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionState::Attentive => "attentive",
            AttentionState::Active => "active",
            AttentionState::LookingAway => "looking_away",
            AttentionState::Drowsy => "drowsy",
            AttentionState::Sleeping => "sleeping",
            AttentionState::Absent => "absent",
            AttentionState::Darkness => "darkness",
        }
    }

    /// Coarse category reported alongside the state.
    pub fn category(&self) -> AttentionCategory {
        match self {
            AttentionState::LookingAway | AttentionState::Drowsy => AttentionCategory::Distracted,
            AttentionState::Sleeping | AttentionState::Absent | AttentionState::Darkness => {
                AttentionCategory::Inactive
            }
            AttentionState::Attentive | AttentionState::Active => AttentionCategory::Attentive,
        }
    }

    /// Whether time spent in this state counts towards the attentive percentage.
    pub fn counts_as_attentive(&self) -> bool {
        matches!(self, AttentionState::Attentive | AttentionState::Active)
    }
}

impl std::fmt::Display for AttentionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping of [`AttentionState`] used by dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionCategory {
    Attentive,
    Distracted,
    Inactive,
}

impl AttentionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionCategory::Attentive => "attentive",
            AttentionCategory::Distracted => "distracted",
            AttentionCategory::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for AttentionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
