use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::{entities::rate_limit::RateLimitEntry, repositories::rate_limit::RateLimitStore};

type Key = String;

/// Process-local store. Each instance of the service counts on its own.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    map: Arc<DashMap<Key, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn record_hit(&self, key: &str, now: DateTime<Utc>, window: Duration) -> RateLimitEntry {
        if let Some(mut existing) = self.map.get_mut(key) {
            existing.record(now, window);
            return *existing;
        }

        match self.map.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                entry.get_mut().record(now, window);
                *entry.get()
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let fresh = RateLimitEntry::start(now, window);
                entry.insert(fresh);
                fresh
            }
        }
    }

    fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.map.get(key).map(|entry| *entry)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.map.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
