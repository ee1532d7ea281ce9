//! Eviction policies for idle attention records.

use std::fmt;
use std::time::Duration;

use crate::models::EpochMillis;

/// Decides whether a record last touched at `last_seen` should be dropped.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    fn should_evict(&self, last_seen: EpochMillis, now: EpochMillis) -> bool;
}

/// Keep every record for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainAll;

impl EvictionPolicy for RetainAll {
    fn should_evict(&self, _last_seen: EpochMillis, _now: EpochMillis) -> bool {
        false
    }
}

/// Drop records not seen for longer than `ttl`.
#[derive(Debug, Clone, Copy)]
pub struct IdleTimeout {
    ttl: Duration,
}

impl IdleTimeout {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl EvictionPolicy for IdleTimeout {
    fn should_evict(&self, last_seen: EpochMillis, now: EpochMillis) -> bool {
        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        now.value().saturating_sub(last_seen.value()) > ttl_millis
    }
}
