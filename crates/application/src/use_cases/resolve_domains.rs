use crate::ports::{
    Clock, Credentials, HttpDnsClient, IpStackDetector, ResolutionCachePort, ResolutionRequest,
};
use crate::services::{
    wait_for_leader, FailoverPolicy, FailureTransition, InflightLeaderGuard, InflightRegistry,
    InflightResult, Registration, RuntimeSettings, ServerFailoverManager,
};
use futures::future::join_all;
use httpdns_domain::{
    normalize_domain, CacheEntry, Config, DomainError, DomainFilter, DomainResolution,
    EncryptionMode, NetworkStack, ResolutionOutcome, ResolutionSource, ResolvedBatch,
    ServerEndpoint, UnresolvedReason,
};
use rustc_hash::FxHashSet;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub type ResolutionMap = HashMap<Arc<str>, DomainResolution>;

/// Engine knobs derived once from the validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct EnginePolicy {
    pub timeout: Duration,
    pub encryption: EncryptionMode,
    pub ttl_ceiling: Duration,
    pub serve_stale: bool,
    pub stale_window: Duration,
    pub retry_on_switch: bool,
}

impl EnginePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.httpdns.timeout(),
            encryption: config.httpdns.encryption,
            ttl_ceiling: Duration::from_secs(u64::from(config.cache.ttl_ceiling_secs)),
            serve_stale: config.cache.serve_stale,
            stale_window: Duration::from_secs(u64::from(config.cache.stale_window_secs)),
            retry_on_switch: config.httpdns.retry_on_switch,
        }
    }
}

/// Resolves domain bursts: cache first, then one HTTPDNS exchange for the
/// misses against whichever endpoint the failover manager currently serves.
pub struct ResolutionEngine {
    detector: Arc<dyn IpStackDetector>,
    client: Arc<dyn HttpDnsClient>,
    cache: Arc<dyn ResolutionCachePort>,
    clock: Arc<dyn Clock>,
    failover: Arc<ServerFailoverManager>,
    settings: Arc<RuntimeSettings>,
    inflight: InflightRegistry,
    credentials: Arc<Credentials>,
    filter: DomainFilter,
    policy: EnginePolicy,
    last_stack: AtomicU8,
}

impl ResolutionEngine {
    pub fn new(
        config: &Config,
        detector: Arc<dyn IpStackDetector>,
        client: Arc<dyn HttpDnsClient>,
        cache: Arc<dyn ResolutionCachePort>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        config
            .validate()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;

        let failover = ServerFailoverManager::new(
            config.httpdns.endpoints(),
            FailoverPolicy::from_config(&config.httpdns),
            Arc::clone(&clock),
        )?;

        Ok(Self {
            detector,
            client,
            cache,
            clock,
            failover: Arc::new(failover),
            settings: Arc::new(RuntimeSettings::new(config.httpdns.route_ip.as_deref())),
            inflight: InflightRegistry::new(),
            credentials: Arc::new(Credentials::from_config(&config.httpdns)),
            filter: config.httpdns.domain_filter(),
            policy: EnginePolicy::from_config(config),
            last_stack: AtomicU8::new(NetworkStack::None.as_u8()),
        })
    }

    pub fn failover(&self) -> &Arc<ServerFailoverManager> {
        &self.failover
    }

    pub fn settings(&self) -> &Arc<RuntimeSettings> {
        &self.settings
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    pub async fn resolve<I, S>(&self, domains: I) -> ResolutionMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_with_stack(domains, None).await
    }

    /// Resolves a burst of domains. `stack` overrides detection when given.
    ///
    /// Every distinct, non-empty input domain appears in the result, keyed by its
    /// normalized form.
    pub async fn resolve_with_stack<I, S>(
        &self,
        domains: I,
        stack: Option<NetworkStack>,
    ) -> ResolutionMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stack = match stack {
            Some(stack) => stack,
            None => self.detect_stack().await,
        };
        self.last_stack.store(stack.as_u8(), Ordering::Relaxed);

        let mut results = ResolutionMap::new();
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        let mut misses: Vec<Arc<str>> = Vec::new();
        let now = self.clock.now();

        for raw in domains {
            let normalized = normalize_domain(raw.as_ref());
            if normalized.is_empty() {
                debug!(domain = %raw.as_ref(), "Skipping empty domain");
                continue;
            }
            let domain: Arc<str> = Arc::from(normalized);
            if !seen.insert(Arc::clone(&domain)) {
                continue;
            }

            if !self.filter.allows(&domain) {
                debug!(domain = %domain, "Domain excluded from HTTPDNS");
                results.insert(domain, DomainResolution::Unresolved(UnresolvedReason::Excluded));
                continue;
            }

            if let Some(entry) = self.cache.get(&domain, stack, now) {
                debug!(domain = %domain, stack = %stack, "Cache hit");
                results.insert(domain, resolved(entry.addresses, ResolutionSource::Cache));
                continue;
            }

            if stack == NetworkStack::None {
                results.insert(
                    domain,
                    DomainResolution::Unresolved(UnresolvedReason::NoConnectivity),
                );
                continue;
            }

            misses.push(domain);
        }

        if misses.is_empty() {
            return results;
        }

        let mut leaders = Vec::new();
        let mut followers = Vec::new();
        for domain in misses {
            match self.inflight.register_or_join((Arc::clone(&domain), stack)) {
                Registration::Leader(guard) => {
                    // Another caller may have finished between the cache check
                    // and registration.
                    if let Some(entry) = self.cache.get(&domain, stack, self.clock.now()) {
                        guard.complete(Ok(Arc::clone(&entry.addresses)));
                        results.insert(domain, resolved(entry.addresses, ResolutionSource::Cache));
                    } else {
                        leaders.push(guard);
                    }
                }
                Registration::Follower(rx) => followers.push((domain, rx)),
            }
        }

        debug!(
            stack = %stack,
            leaders = leaders.len(),
            followers = followers.len(),
            "Resolving cache misses"
        );

        let (led, followed) = tokio::join!(
            self.lead(leaders, stack),
            join_all(
                followers
                    .into_iter()
                    .map(|(domain, rx)| self.follow(domain, stack, rx))
            )
        );

        results.extend(led);
        results.extend(followed);
        results
    }

    /// Synchronous cache-only lookup for connection rewriting. Tries the most
    /// recently detected stack first.
    pub fn lookup_cached(&self, host: &str) -> Option<Arc<[IpAddr]>> {
        let domain = normalize_domain(host);
        if domain.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let last = NetworkStack::from_u8(self.last_stack.load(Ordering::Relaxed));
        let order = [
            last,
            NetworkStack::Dual,
            NetworkStack::Ipv4Only,
            NetworkStack::Ipv6Only,
        ];

        order
            .iter()
            .filter(|stack| **stack != NetworkStack::None)
            .find_map(|stack| self.cache.get(&domain, *stack, now))
            .map(|entry| entry.addresses)
    }

    async fn detect_stack(&self) -> NetworkStack {
        let detector = Arc::clone(&self.detector);
        match tokio::task::spawn_blocking(move || detector.detect()).await {
            Ok(stack) => stack,
            Err(e) => {
                warn!(error = %e, "IP stack detection task failed");
                NetworkStack::None
            }
        }
    }

    async fn lead(
        &self,
        leaders: Vec<InflightLeaderGuard>,
        stack: NetworkStack,
    ) -> Vec<(Arc<str>, DomainResolution)> {
        if leaders.is_empty() {
            return Vec::new();
        }

        let domains: Vec<Arc<str>> = leaders.iter().map(|g| Arc::clone(&g.key().0)).collect();
        let outcome = self.exchange(&domains, stack).await;

        match outcome {
            ResolutionOutcome::Success(batch) => leaders
                .into_iter()
                .map(|guard| self.settle_success(guard, &batch, stack))
                .collect(),
            failure => {
                let reason = failure
                    .failure_reason()
                    .unwrap_or(UnresolvedReason::Transport);
                leaders
                    .into_iter()
                    .map(|guard| {
                        let domain = Arc::clone(&guard.key().0);
                        guard.complete(Err(reason));
                        let resolution = self.fallback(&domain, stack, reason);
                        (domain, resolution)
                    })
                    .collect()
            }
        }
    }

    fn settle_success(
        &self,
        guard: InflightLeaderGuard,
        batch: &ResolvedBatch,
        stack: NetworkStack,
    ) -> (Arc<str>, DomainResolution) {
        let domain = Arc::clone(&guard.key().0);
        let answer = batch
            .answer_for(&domain)
            .filter(|answer| !answer.addresses.is_empty());

        let Some(answer) = answer else {
            debug!(domain = %domain, "No addresses for domain in response");
            guard.complete(Err(UnresolvedReason::NotInResponse));
            let resolution = self.fallback(&domain, stack, UnresolvedReason::NotInResponse);
            return (domain, resolution);
        };

        let now = self.clock.now();
        let ttl = self.effective_ttl(answer.ttl, batch.server_expiry);
        let entry = CacheEntry::new(
            Arc::clone(&domain),
            stack,
            answer.addresses.clone(),
            now + ttl,
        );
        let addresses = Arc::clone(&entry.addresses);
        if !ttl.is_zero() {
            self.cache.put(entry);
        }

        debug!(
            domain = %domain,
            stack = %stack,
            addresses = addresses.len(),
            ttl_secs = ttl.as_secs(),
            "Resolved via HTTPDNS"
        );

        guard.complete(Ok(Arc::clone(&addresses)));
        (domain, resolved(addresses, ResolutionSource::Network))
    }

    async fn follow(
        &self,
        domain: Arc<str>,
        stack: NetworkStack,
        rx: watch::Receiver<Option<Arc<InflightResult>>>,
    ) -> (Arc<str>, DomainResolution) {
        let resolution = match wait_for_leader(rx).await {
            Some(result) => match &*result {
                Ok(addresses) => resolved(Arc::clone(addresses), ResolutionSource::Cache),
                Err(reason) => self.fallback(&domain, stack, *reason),
            },
            None => match self.cache.get(&domain, stack, self.clock.now()) {
                Some(entry) => resolved(entry.addresses, ResolutionSource::Cache),
                None => self.fallback(&domain, stack, UnresolvedReason::Timeout),
            },
        };
        (domain, resolution)
    }

    /// One exchange against the current endpoint, plus at most one retry when
    /// that failure moved the failover manager to another endpoint.
    async fn exchange(&self, domains: &[Arc<str>], stack: NetworkStack) -> ResolutionOutcome {
        let endpoint = self.failover.current_endpoint();
        let outcome = self.exchange_once(domains, &endpoint, stack).await;

        match self.account(&endpoint, &outcome) {
            Some(FailureTransition::Switched { to, .. }) if self.policy.retry_on_switch => {
                info!(endpoint = %to, domains = domains.len(), "Retrying batch on new endpoint");
                let retry = self.exchange_once(domains, &to, stack).await;
                self.account(&to, &retry);
                retry
            }
            _ => outcome,
        }
    }

    async fn exchange_once(
        &self,
        domains: &[Arc<str>],
        endpoint: &ServerEndpoint,
        stack: NetworkStack,
    ) -> ResolutionOutcome {
        let request = ResolutionRequest {
            domains: domains.to_vec(),
            endpoint: endpoint.clone(),
            stack,
            timeout: self.policy.timeout,
            credentials: Arc::clone(&self.credentials),
            encryption: self.policy.encryption,
            route_ip: self.settings.route_ip(),
        };
        self.client.resolve(request).await
    }

    fn account(
        &self,
        endpoint: &ServerEndpoint,
        outcome: &ResolutionOutcome,
    ) -> Option<FailureTransition> {
        if outcome.is_success() {
            self.failover.record_success(endpoint);
            return None;
        }

        warn!(endpoint = %endpoint, outcome = %outcome, "HTTPDNS exchange failed");
        Some(self.failover.record_failure(endpoint))
    }

    fn effective_ttl(&self, ttl_secs: u32, server_expiry: Option<u64>) -> Duration {
        let mut ttl = Duration::from_secs(u64::from(ttl_secs)).min(self.policy.ttl_ceiling);
        if let Some(expiry) = server_expiry {
            let remaining = Duration::from_secs(expiry.saturating_sub(self.clock.unix_now()));
            ttl = ttl.min(remaining);
        }
        ttl
    }

    fn fallback(
        &self,
        domain: &str,
        stack: NetworkStack,
        reason: UnresolvedReason,
    ) -> DomainResolution {
        if self.policy.serve_stale {
            let now = self.clock.now();
            if let Some(entry) = self
                .cache
                .get_stale(domain, stack, now, self.policy.stale_window)
            {
                debug!(domain = %domain, reason = %reason, "Serving stale entry");
                return resolved(entry.addresses, ResolutionSource::Stale);
            }
        }
        DomainResolution::Unresolved(reason)
    }
}

fn resolved(addresses: Arc<[IpAddr]>, source: ResolutionSource) -> DomainResolution {
    DomainResolution::Resolved { addresses, source }
}
