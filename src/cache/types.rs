//! Strong types for cache metadata
//!
//! [`TimestampMillis`] is a Unix timestamp in milliseconds used for cache
//! entry ordering and absolute expiry. Milliseconds rather than seconds keep
//! ordering unique for entries created in rapid succession, which matters
//! when the disk tier evicts its oldest entry.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampMillis(u128);

impl TimestampMillis {
    /// Creates a timestamp representing the current time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(millis)
    }

    /// Creates a timestamp from a raw millisecond value.
    #[cfg(test)]
    pub(crate) fn from_millis(millis: u128) -> Self {
        Self(millis)
    }

    /// The timestamp `duration` after this one, saturating.
    pub fn plus(&self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.as_millis()))
    }

    /// Calculates the age of this timestamp relative to now.
    ///
    /// Future timestamps report zero age.
    pub fn age_since_now(&self) -> Duration {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        let age_millis = now_millis.saturating_sub(self.0);
        Duration::from_millis(age_millis as u64)
    }

    /// Checks if this timestamp is older than the given duration.
    pub fn is_older_than(&self, duration: Duration) -> bool {
        self.age_since_now() > duration
    }

    /// Checks if this timestamp lies in the past.
    ///
    /// Used for absolute expiry: an entry whose expiry timestamp has passed
    /// is a miss regardless of key match.
    pub fn is_past(&self) -> bool {
        *self < Self::now()
    }
}

impl Default for TimestampMillis {
    fn default() -> Self {
        Self::now()
    }
}
