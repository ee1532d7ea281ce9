//! Service layer: attention inference and request orchestration.
//!
//! - [`metrics`]: per-frame brightness, contrast, face presence, eye openness and looking score
//! - [`calibration`]: one-time lighting baselines per user
//! - [`classifier`]: rolling-window state classification with majority smoothing
//! - [`confidence`]: consistency-based confidence of a classified state
//! - [`history`]: state durations and attentive percentage
//! - [`attention`]: the detect / calibrate / room / health operations

pub mod attention;
pub mod calibration;
pub mod classifier;
pub mod confidence;
pub mod history;
pub mod metrics;

pub use attention::{
    analyze_frame, calibrate_user, detect_attention, health, room_attention, AttentionError,
    AttentionReport, AttentionResult, AttentionSnapshot, CalibrationOutcome, HealthStatus,
    RoomAttention,
};
pub use classifier::{Classification, Decision, TemporalClassifier};
pub use history::{AttentionHistory, Transition};
pub use metrics::FrameMetrics;
