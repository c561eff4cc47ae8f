use super::key::CacheKey;
use dashmap::DashMap;
use httpdns_application::ports::ResolutionCachePort;
use httpdns_domain::{CacheConfig, CacheEntry, NetworkStack};
use rustc_hash::FxBuildHasher;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Resolved addresses keyed by `(domain, stack)`.
///
/// Expiry is lazy: reads ignore entries past `expires_at`, and entries are only
/// removed once they are also past the retention window (by a read or a sweep).
pub struct ResolutionCache {
    entries: DashMap<CacheKey, CacheEntry, FxBuildHasher>,
    retention: Duration,
}

impl ResolutionCache {
    pub fn new(config: &CacheConfig) -> Self {
        let retention = Duration::from_secs(u64::from(config.retention_secs()));

        info!(
            capacity = config.max_entries,
            retention_secs = retention.as_secs(),
            "Initializing resolution cache"
        );

        Self::with_retention(config.max_entries, retention)
    }

    pub fn with_retention(capacity: usize, retention: Duration) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            retention,
        }
    }

    fn is_retained_at(&self, entry: &CacheEntry, now: Instant) -> bool {
        now < entry.expires_at + self.retention
    }
}

impl ResolutionCachePort for ResolutionCache {
    fn get(&self, domain: &str, stack: NetworkStack, now: Instant) -> Option<CacheEntry> {
        let key = CacheKey::new(domain, stack);
        let entry = self.entries.get(&key)?;
        if entry.is_fresh_at(now) {
            return Some(entry.value().clone());
        }

        let retained = self.is_retained_at(entry.value(), now);
        drop(entry);
        if !retained {
            self.entries
                .remove_if(&key, |_, e| !self.is_retained_at(e, now));
        }
        None
    }

    fn get_stale(
        &self,
        domain: &str,
        stack: NetworkStack,
        now: Instant,
        window: Duration,
    ) -> Option<CacheEntry> {
        let entry = self.entries.get(&CacheKey::new(domain, stack))?;
        if now < entry.expires_at + window {
            Some(entry.value().clone())
        } else {
            None
        }
    }

    fn put(&self, entry: CacheEntry) {
        let key = CacheKey::new(&entry.domain, entry.stack);
        self.entries.insert(key, entry);
    }

    fn evict_expired(&self, now: Instant) -> usize {
        let mut evicted = 0usize;
        self.entries.retain(|_, entry| {
            let keep = self.is_retained_at(entry, now);
            if !keep {
                evicted += 1;
            }
            keep
        });

        if evicted > 0 {
            debug!(evicted, remaining = self.entries.len(), "Evicted expired cache entries");
        }
        evicted
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
