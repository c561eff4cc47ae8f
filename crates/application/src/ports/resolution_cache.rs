use httpdns_domain::{CacheEntry, NetworkStack};
use std::time::{Duration, Instant};

pub trait ResolutionCachePort: Send + Sync {
    /// Fresh entry for the key, `None` once `now >= expires_at`.
    fn get(&self, domain: &str, stack: NetworkStack, now: Instant) -> Option<CacheEntry>;

    /// Entry that expired no more than `window` ago.
    fn get_stale(
        &self,
        domain: &str,
        stack: NetworkStack,
        now: Instant,
        window: Duration,
    ) -> Option<CacheEntry>;

    /// Unconditional overwrite keyed by `(domain, stack)`.
    fn put(&self, entry: CacheEntry);

    /// Removes entries expired at `now`, returns how many were dropped.
    fn evict_expired(&self, now: Instant) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
