use std::sync::Arc;

use chrono::Duration;
use rand::Rng;

use crate::{
    constants::{DEFAULT_MAX_REQUESTS, DEFAULT_SWEEP_PROBABILITY},
    entities::rate_limit::RateLimitDecision,
    repositories::rate_limit::RateLimitStore,
};

use super::clock::{Clock, SystemClock};
use super::store::InMemoryRateLimitStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
    /// Chance that a check also purges every expired entry.
    pub sweep_probability: f64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: Duration::minutes(15),
            sweep_probability: DEFAULT_SWEEP_PROBABILITY,
        }
    }
}

/// Fixed-window limiter: a client's window opens on its first request after
/// the previous one expired, and every request inside it counts, including
/// the ones that get blocked.
#[derive(Clone)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(
        policy: RateLimitPolicy,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        RateLimiter { policy, store, clock }
    }

    pub fn in_memory(policy: RateLimitPolicy) -> Self {
        Self::new(
            policy,
            Arc::new(InMemoryRateLimitStore::new()),
            Arc::new(SystemClock),
        )
    }

    /// Counts one request for `client_id` and reports whether it is over
    /// budget.
    pub fn check(&self, client_id: &str) -> RateLimitDecision {
        let now = self.clock.now();

        if self.should_sweep() {
            let purged = self.store.purge_expired(now);
            if purged > 0 {
                tracing::debug!(purged, "Swept expired rate-limit entries");
            }
        }

        let entry = self.store.record_hit(client_id, now, self.policy.window);
        let decision = RateLimitDecision::from_entry(&entry, self.policy.max_requests, now);

        if decision.limited {
            tracing::warn!(
                client_id,
                count = entry.count,
                limit = self.policy.max_requests,
                retry_after = decision.retry_after_secs,
                "Rate limit exceeded"
            );
        }

        decision
    }

    pub fn purge_expired(&self) -> usize {
        if self.store.is_empty() {
            return 0;
        }
        self.store.purge_expired(self.clock.now())
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    fn should_sweep(&self) -> bool {
        let probability = self.policy.sweep_probability.clamp(0.0, 1.0);
        probability > 0.0 && rand::thread_rng().gen_bool(probability)
    }
}
