use serde::{Deserialize, Serialize};

/// Wall-clock instant as milliseconds since the Unix epoch.
///
/// This is the unit every timestamp on the wire uses (`stateSince`,
/// `timestamp`, history `start_time`/`end_time`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// Create a new timestamp from raw milliseconds.
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    /// Raw millisecond value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Signed number of seconds elapsed from `earlier` to `self`.
    ///
    /// Negative when `earlier` lies in the future (clock skew); callers decide
    /// whether to clamp.
    pub fn seconds_since(&self, earlier: EpochMillis) -> f64 {
        (self.0 - earlier.0) as f64 / 1000.0
    }

    /// Shift by a number of milliseconds.
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Convert to chrono DateTime<Utc>.
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.0).unwrap_or(chrono::DateTime::UNIX_EPOCH)
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl From<i64> for EpochMillis {
    fn from(v: i64) -> Self {
        EpochMillis::new(v)
    }
}
