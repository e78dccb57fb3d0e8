use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Per-client counter for the current fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

impl RateLimitEntry {
    /// Opens a new window anchored at `now`.
    pub fn start(now: DateTime<Utc>, window: Duration) -> Self {
        RateLimitEntry {
            count: 1,
            reset_time: now + window,
        }
    }

    /// An entry only counts while `now < reset_time`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_time
    }

    /// Records one more request, replacing the entry if its window has passed.
    pub fn record(&mut self, now: DateTime<Utc>, window: Duration) {
        if self.is_expired(now) {
            *self = RateLimitEntry::start(now, window);
        } else {
            self.count = self.count.saturating_add(1);
        }
    }
}

/// Outcome of a single limiter check, carrying everything the
/// `X-RateLimit-*` headers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub limited: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
    /// Whole seconds until the window resets, only set when `limited`.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitDecision {
    pub fn from_entry(entry: &RateLimitEntry, limit: u32, now: DateTime<Utc>) -> Self {
        let limited = entry.count > limit;

        RateLimitDecision {
            limited,
            limit,
            remaining: if limited { 0 } else { limit - entry.count },
            reset_time: entry.reset_time,
            retry_after_secs: limited.then(|| seconds_until(entry.reset_time, now)),
        }
    }

    /// Reset time as epoch milliseconds, the unit of `X-RateLimit-Reset`.
    pub fn reset_millis(&self) -> i64 {
        self.reset_time.timestamp_millis()
    }
}

fn seconds_until(reset_time: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (reset_time - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
