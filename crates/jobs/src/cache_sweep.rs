use httpdns_application::ports::{Clock, ResolutionCachePort};
use httpdns_domain::CacheConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Periodically drops cache entries that are past expiry and any stale window.
///
/// Lookups already evict lazily; the sweep only bounds memory for domains
/// that are never asked for again.
pub struct CacheSweepJob {
    cache: Arc<dyn ResolutionCachePort>,
    clock: Arc<dyn Clock>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl CacheSweepJob {
    pub fn new(cache: Arc<dyn ResolutionCachePort>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns `None` when the configuration disables the sweep.
    pub fn from_config(
        config: &CacheConfig,
        cache: Arc<dyn ResolutionCachePort>,
        clock: Arc<dyn Clock>,
    ) -> Option<Self> {
        if config.sweep_interval_secs == 0 {
            return None;
        }
        Some(Self::new(cache, clock).with_interval(config.sweep_interval_secs))
    }

    pub fn with_interval(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Runs one sweep and returns the number of evicted entries.
    pub fn sweep_once(&self) -> usize {
        let evicted = self.cache.evict_expired(self.clock.now());
        if evicted > 0 {
            info!(
                evicted,
                remaining = self.cache.len(),
                "Cache sweep completed"
            );
        } else {
            debug!(remaining = self.cache.len(), "Cache sweep found nothing to evict");
        }
        evicted
    }

    pub async fn start(self: Arc<Self>) {
        if self.interval_secs == 0 {
            info!("CacheSweepJob: disabled (interval is zero)");
            return;
        }

        info!(interval_secs = self.interval_secs, "Starting cache sweep job");

        let job = Arc::clone(&self);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(job.interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("CacheSweepJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        job.sweep_once();
                    }
                }
            }
        });
    }
}
