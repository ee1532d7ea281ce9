//! In-memory local repository implementation.
//!
//! Attention records live in a map of per-user mutexes. The outer lock is
//! only held to find or insert a slot, so one user's request never waits on
//! another user's classification.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use parking_lot::{Mutex, RwLock};

use crate::db::eviction::{EvictionPolicy, RetainAll};
use crate::db::repository::{AttentionRepository, RecordHandle};
use crate::models::{CalibrationRecord, EpochMillis, UserAttentionRecord, UserId};

/// In-memory local repository.
///
/// Cloning is cheap and yields a handle to the same data.
///
/// # Example
/// ```
/// use attention_rust::db::{AttentionRepository, LocalRepository};
/// use attention_rust::models::{EpochMillis, UserId};
///
/// let repo = LocalRepository::new();
/// let user = UserId::new("alice");
/// assert!(repo.record(&user).is_none());
///
/// repo.record_or_insert(&user, EpochMillis::new(0));
/// assert_eq!(repo.users_tracked(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<LocalData>,
}

struct LocalData {
    records: RwLock<HashMap<UserId, RecordHandle>>,
    calibrations: RwLock<HashMap<UserId, CalibrationRecord>>,
    eviction: Box<dyn EvictionPolicy>,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRepository")
            .field("users_tracked", &self.data.records.read().len())
            .field("calibrations", &self.data.calibrations.read().len())
            .field("eviction", &self.data.eviction)
            .finish()
    }
}

impl LocalRepository {
    /// Create an empty repository that keeps every record.
    pub fn new() -> Self {
        Self::with_eviction(RetainAll)
    }

    /// Create an empty repository with the given eviction policy.
    pub fn with_eviction(policy: impl EvictionPolicy + 'static) -> Self {
        Self {
            data: Arc::new(LocalData {
                records: RwLock::new(HashMap::new()),
                calibrations: RwLock::new(HashMap::new()),
                eviction: Box::new(policy),
            }),
        }
    }

    /// Ids of every tracked user, in no particular order.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.data.records.read().keys().cloned().collect()
    }

    /// Remove all attention and calibration records.
    pub fn clear(&self) {
        self.data.records.write().clear();
        self.data.calibrations.write().clear();
    }
}

impl AttentionRepository for LocalRepository {
    fn record(&self, user_id: &UserId) -> Option<RecordHandle> {
        self.data.records.read().get(user_id).cloned()
    }

    fn record_or_insert(&self, user_id: &UserId, now: EpochMillis) -> RecordHandle {
        // Touched under the map lock so a concurrent sweep cannot drop the
        // slot between this lookup and the caller locking it.
        if let Some(existing) = self.data.records.read().get(user_id) {
            touch(existing, now);
            return existing.clone();
        }
        let mut records = self.data.records.write();
        let handle = records.entry(user_id.clone()).or_insert_with(|| {
            Arc::new(Mutex::new(UserAttentionRecord::new(user_id.clone(), now)))
        });
        touch(handle, now);
        handle.clone()
    }

    fn calibration(&self, user_id: &UserId) -> Option<CalibrationRecord> {
        self.data.calibrations.read().get(user_id).copied()
    }

    fn insert_calibration_if_absent(&self, user_id: &UserId, record: CalibrationRecord) -> bool {
        let mut calibrations = self.data.calibrations.write();
        if calibrations.contains_key(user_id) {
            return false;
        }
        calibrations.insert(user_id.clone(), record);
        true
    }

    fn users_tracked(&self) -> usize {
        self.data.records.read().len()
    }

    fn evict_idle(&self, now: EpochMillis) -> usize {
        let mut records = self.data.records.write();
        let before = records.len();
        records.retain(|_, record| {
            let last_seen = record.lock().last_seen;
            !self.data.eviction.should_evict(last_seen, now)
        });
        let evicted = before - records.len();
        if evicted > 0 {
            info!("evicted {} idle attention record(s)", evicted);
        }
        evicted
    }
}

fn touch(handle: &RecordHandle, now: EpochMillis) {
    let mut record = handle.lock();
    if now > record.last_seen {
        record.last_seen = now;
    }
}
