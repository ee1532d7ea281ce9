//! Storage seam for per-user attention state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::{CalibrationRecord, EpochMillis, UserAttentionRecord, UserId};

/// Shared handle to one user's record.
///
/// The read-modify-write of a single request happens while holding this
/// mutex; different users never contend on it.
pub type RecordHandle = Arc<Mutex<UserAttentionRecord>>;

/// Store of attention and calibration records keyed by user id.
///
/// Implementations must be cheap to call from async handlers: no method
/// blocks beyond short map lookups.
pub trait AttentionRepository: Send + Sync {
    /// Existing record for a user, if any. Never creates one.
    fn record(&self, user_id: &UserId) -> Option<RecordHandle>;

    /// Existing record for a user, or a fresh one first seen at `now`.
    ///
    /// The record's `last_seen` is advanced to `now` before the handle is
    /// returned, so [`evict_idle`](Self::evict_idle) keeps it.
    fn record_or_insert(&self, user_id: &UserId, now: EpochMillis) -> RecordHandle;

    fn calibration(&self, user_id: &UserId) -> Option<CalibrationRecord>;

    /// Store a calibration unless one already exists.
    ///
    /// Returns `true` when this call stored the record.
    fn insert_calibration_if_absent(&self, user_id: &UserId, record: CalibrationRecord) -> bool;

    /// Number of live attention records.
    fn users_tracked(&self) -> usize;

    /// Drop attention records the eviction policy considers idle at `now`.
    ///
    /// Returns the number of records removed. Calibrations are kept.
    fn evict_idle(&self, now: EpochMillis) -> usize;
}
