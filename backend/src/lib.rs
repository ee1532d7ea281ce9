//! # Attention Rust Backend
//!
//! Classifies a user's attention state from webcam frames.
//!
//! Each frame is reduced to a handful of metrics (brightness, contrast,
//! face presence, eye openness, head looking score) computed from landmarks
//! supplied by an external vision provider. A per-user temporal classifier
//! smooths those metrics into one of seven states, and a history tracker
//! turns state changes into an attentive-time percentage.
//!
//! ## Architecture
//!
//! - [`api`]: Types that appear on the wire
//! - [`models`]: Domain types (ids, states, measurements, rolling windows, records)
//! - [`vision`]: Frame decoding and the landmark provider seam
//! - [`services`]: Metrics, calibration, classifier, confidence, history, orchestration
//! - [`db`]: In-memory attention store with per-user locking and eviction
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Example
//!
//! ```
//! use attention_rust::db::LocalRepository;
//! use attention_rust::models::{AttentionState, EpochMillis, RoomId, UserId};
//! use attention_rust::services::room_attention;
//!
//! let repo = LocalRepository::new();
//! let room = room_attention(&repo, &RoomId::new("r1"), &[UserId::new("new")], EpochMillis::new(0));
//! assert_eq!(room.attention[&UserId::new("new")].state, AttentionState::Absent);
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod vision;

#[cfg(feature = "http-server")]
pub mod http;
