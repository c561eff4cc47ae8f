#![allow(dead_code)]

use httpdns_application::ports::{Clock, ResolutionCachePort};
use httpdns_domain::{CacheEntry, NetworkStack};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct MockResolutionCache {
    entries: Mutex<HashMap<(String, NetworkStack), CacheEntry>>,
    evict_calls: AtomicUsize,
}

impl MockResolutionCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            evict_calls: AtomicUsize::new(0),
        }
    }

    pub fn insert_expiring(&self, domain: &str, expires_at: Instant) {
        self.put(CacheEntry::new(
            domain,
            NetworkStack::Ipv4Only,
            vec!["1.2.3.4".parse().unwrap()],
            expires_at,
        ));
    }

    pub fn evict_calls(&self) -> usize {
        self.evict_calls.load(Ordering::SeqCst)
    }
}

impl ResolutionCachePort for MockResolutionCache {
    fn get(&self, domain: &str, stack: NetworkStack, now: Instant) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(&(domain.to_string(), stack))
            .filter(|entry| entry.is_fresh_at(now))
            .cloned()
    }

    fn get_stale(
        &self,
        domain: &str,
        stack: NetworkStack,
        _now: Instant,
        _window: Duration,
    ) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(&(domain.to_string(), stack))
            .cloned()
    }

    fn put(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert((entry.domain.to_string(), entry.stack), entry);
    }

    fn evict_expired(&self, now: Instant) -> usize {
        self.evict_calls.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh_at(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Wall-clock `now`, fixed unix time.
pub struct TestClock;

impl Clock for TestClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_now(&self) -> u64 {
        1_700_000_000
    }
}
