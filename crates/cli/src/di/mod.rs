use httpdns_application::use_cases::ResolutionEngine;
use httpdns_domain::Config;
use httpdns_infrastructure::dns::{HttpsDnsClient, ResolutionCache};
use httpdns_infrastructure::system::{SystemClock, SystemIpStackDetector};
use httpdns_jobs::CacheSweepJob;
use std::sync::Arc;
use tracing::info;

pub struct HttpDnsServices {
    pub engine: Arc<ResolutionEngine>,
    pub cache: Arc<ResolutionCache>,
    pub clock: Arc<SystemClock>,
}

impl HttpDnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing HTTPDNS services");

        let clock = Arc::new(SystemClock);
        let cache = Arc::new(ResolutionCache::new(&config.cache));
        let client = Arc::new(HttpsDnsClient::new(&config.httpdns, clock.clone()));
        let detector = Arc::new(SystemIpStackDetector::new());

        let engine = ResolutionEngine::new(config, detector, client, cache.clone(), clock.clone())?;

        info!(
            primary = %config.httpdns.primary_server,
            backups = config.httpdns.backup_servers.len(),
            encryption = config.httpdns.encryption.as_str(),
            failure_threshold = config.httpdns.failure_threshold,
            "HTTPDNS services ready"
        );

        Ok(Self {
            engine: Arc::new(engine),
            cache,
            clock,
        })
    }

    pub fn sweep_job(&self, config: &Config) -> Option<CacheSweepJob> {
        CacheSweepJob::from_config(&config.cache, self.cache.clone(), self.clock.clone())
    }
}
