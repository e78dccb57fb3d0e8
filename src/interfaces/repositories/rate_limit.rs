use chrono::{DateTime, Duration, Utc};

use crate::entities::rate_limit::RateLimitEntry;

/// Storage seam for rate-limit counters. The in-memory store is the only
/// implementation; a shared counter service would slot in here for a
/// multi-instance deployment.
pub trait RateLimitStore: Send + Sync {
    /// Records one request for `key` and returns the updated entry. Starts a
    /// new window when the key is absent or its window has expired.
    fn record_hit(&self, key: &str, now: DateTime<Utc>, window: Duration) -> RateLimitEntry;

    fn get(&self, key: &str) -> Option<RateLimitEntry>;

    /// Removes every entry whose window has passed, returning how many went.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
