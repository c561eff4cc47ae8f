#![allow(dead_code)]

use async_trait::async_trait;
use httpdns_application::ports::{
    Clock, HttpDnsClient, IpStackDetector, ResolutionCachePort, ResolutionRequest,
};
use httpdns_application::use_cases::ResolutionEngine;
use httpdns_domain::{
    CacheEntry, Config, DomainAnswer, EncryptionMode, NetworkStack, ResolutionOutcome,
    ResolvedBatch,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const PRIMARY: &str = "primary.httpdns.test";
pub const BACKUP_1: &str = "backup1.httpdns.test";
pub const BACKUP_2: &str = "backup2.httpdns.test";

pub fn test_config(backups: &[&str]) -> Config {
    let mut config = Config::default();
    config.httpdns.app_id = "1000".to_string();
    config.httpdns.open_id = "open-1000".to_string();
    config.httpdns.service_id = 42;
    config.httpdns.encryption = EncryptionMode::None;
    config.httpdns.primary_server = PRIMARY.to_string();
    config.httpdns.backup_servers = backups.iter().map(|b| b.to_string()).collect();
    config
}

pub struct Harness {
    pub engine: ResolutionEngine,
    pub client: Arc<MockHttpDnsClient>,
    pub detector: Arc<MockDetector>,
    pub cache: Arc<InMemoryCache>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(config: &Config, stack: NetworkStack) -> Harness {
    let client = Arc::new(MockHttpDnsClient::new());
    let detector = Arc::new(MockDetector::new(stack));
    let cache = Arc::new(InMemoryCache::new());
    let clock = Arc::new(ManualClock::new());

    let engine = ResolutionEngine::new(
        config,
        detector.clone(),
        client.clone(),
        cache.clone(),
        clock.clone(),
    )
    .unwrap();

    Harness {
        engine,
        client,
        detector,
        cache,
        clock,
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

// ── Clock ──────────────────────────────────────────────────────────────────

pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

pub const UNIX_BASE: u64 = 1_700_000_000;

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    fn unix_now(&self) -> u64 {
        UNIX_BASE + self.offset.lock().unwrap().as_secs()
    }
}

// ── Detector ───────────────────────────────────────────────────────────────

pub struct MockDetector {
    stack: AtomicU8,
    calls: AtomicUsize,
}

impl MockDetector {
    pub fn new(stack: NetworkStack) -> Self {
        Self {
            stack: AtomicU8::new(stack.as_u8()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_stack(&self, stack: NetworkStack) {
        self.stack.store(stack.as_u8(), Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IpStackDetector for MockDetector {
    fn detect(&self) -> NetworkStack {
        self.calls.fetch_add(1, Ordering::SeqCst);
        NetworkStack::from_u8(self.stack.load(Ordering::SeqCst))
    }
}

// ── HTTPDNS client ─────────────────────────────────────────────────────────

pub struct MockHttpDnsClient {
    answers: Mutex<HashMap<String, Vec<IpAddr>>>,
    failing: Mutex<HashMap<String, ResolutionOutcome>>,
    ttl: AtomicU32,
    server_expiry: Mutex<Option<u64>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ResolutionRequest>>,
}

impl MockHttpDnsClient {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashMap::new()),
            ttl: AtomicU32::new(60),
            server_expiry: Mutex::new(None),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, domain: &str, ips: &[&str]) {
        self.answers
            .lock()
            .unwrap()
            .insert(domain.to_string(), ips.iter().map(|s| ip(s)).collect());
    }

    pub fn set_ttl(&self, ttl: u32) {
        self.ttl.store(ttl, Ordering::SeqCst);
    }

    pub fn set_server_expiry(&self, expiry: Option<u64>) {
        *self.server_expiry.lock().unwrap() = expiry;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every exchange against `address` yields `outcome` until cleared.
    pub fn fail_endpoint(&self, address: &str, outcome: ResolutionOutcome) {
        self.failing
            .lock()
            .unwrap()
            .insert(address.to_string(), outcome);
    }

    pub fn heal_endpoint(&self, address: &str) {
        self.failing.lock().unwrap().remove(address);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ResolutionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn endpoints_called(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.endpoint.address.to_string())
            .collect()
    }
}

#[async_trait]
impl HttpDnsClient for MockHttpDnsClient {
    async fn resolve(&self, request: ResolutionRequest) -> ResolutionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self
            .failing
            .lock()
            .unwrap()
            .get(request.endpoint.address.as_ref())
        {
            return outcome.clone();
        }

        let ttl = self.ttl.load(Ordering::SeqCst);
        let answers = {
            let known = self.answers.lock().unwrap();
            request
                .domains
                .iter()
                .filter_map(|domain| {
                    known.get(domain.as_ref()).map(|ips| DomainAnswer {
                        domain: Arc::clone(domain),
                        addresses: ips.clone(),
                        ttl,
                    })
                })
                .collect()
        };

        ResolutionOutcome::Success(ResolvedBatch {
            answers,
            ttl,
            server_expiry: *self.server_expiry.lock().unwrap(),
            client_ip: None,
        })
    }
}

// ── Cache ──────────────────────────────────────────────────────────────────

pub struct InMemoryCache {
    entries: Mutex<HashMap<(String, NetworkStack), CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn entry(&self, domain: &str, stack: NetworkStack) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(&(domain.to_string(), stack))
            .cloned()
    }
}

impl ResolutionCachePort for InMemoryCache {
    fn get(&self, domain: &str, stack: NetworkStack, now: Instant) -> Option<CacheEntry> {
        self.entry(domain, stack).filter(|e| e.is_fresh_at(now))
    }

    fn get_stale(
        &self,
        domain: &str,
        stack: NetworkStack,
        now: Instant,
        window: Duration,
    ) -> Option<CacheEntry> {
        self.entry(domain, stack)
            .filter(|e| now < e.expires_at + window)
    }

    fn put(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert((entry.domain.to_string(), entry.stack), entry);
    }

    fn evict_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, e| e.is_fresh_at(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
