use super::output::{render_json, render_text, ResultRow};
use super::system_dns;
use crate::di::HttpDnsServices;
use futures::future::join_all;
use httpdns_domain::{normalize_domain, Config, DomainResolution, NetworkStack, UnresolvedReason};
use httpdns_jobs::JobRunner;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ResolveOptions {
    pub stack: Option<NetworkStack>,
    pub system_fallback: bool,
    pub json: bool,
    pub watch: Option<u64>,
}

pub async fn run(
    services: &HttpDnsServices,
    config: &Config,
    domains: &[String],
    options: &ResolveOptions,
) -> anyhow::Result<()> {
    let Some(every) = options.watch.filter(|secs| *secs > 0) else {
        return resolve_and_print(services, config, domains, options).await;
    };

    let shutdown = CancellationToken::new();
    let mut runner = JobRunner::new().with_shutdown_token(shutdown.clone());
    if let Some(job) = services.sweep_job(config) {
        runner = runner.with_cache_sweep(job);
    }
    runner.start().await;

    info!(interval_secs = every, "Watching domains, press Ctrl-C to stop");
    let mut interval = tokio::time::interval(Duration::from_secs(every));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
            _ = interval.tick() => {
                resolve_and_print(services, config, domains, options).await?;
            }
        }
    }

    shutdown.cancel();
    Ok(())
}

async fn resolve_and_print(
    services: &HttpDnsServices,
    config: &Config,
    domains: &[String],
    options: &ResolveOptions,
) -> anyhow::Result<()> {
    let results = services
        .engine
        .resolve_with_stack(domains.iter(), options.stack)
        .await;

    let timeout = config.httpdns.timeout();
    let rows = join_all(domains.iter().map(|domain| {
        let key = normalize_domain(domain);
        let resolution = results.get(key.as_str()).cloned();
        async move {
            match resolution {
                Some(DomainResolution::Unresolved(reason)) if options.system_fallback => {
                    fall_back(&key, reason, timeout).await
                }
                Some(resolution) => ResultRow::from_resolution(&key, &resolution),
                None => ResultRow::unresolved(domain, "invalid domain".to_string()),
            }
        }
    }))
    .await;

    let snapshot = services.engine.failover().snapshot();
    debug!(
        endpoint = %snapshot.current,
        consecutive_failures = snapshot.state.consecutive_failures,
        "Failover state after resolution"
    );

    if options.json {
        println!("{}", render_json(&rows)?);
    } else {
        print!("{}", render_text(&rows));
    }
    Ok(())
}

async fn fall_back(domain: &str, reason: UnresolvedReason, timeout: Duration) -> ResultRow {
    debug!(domain = %domain, reason = %reason, "Falling back to system DNS");
    match system_dns::lookup(domain, timeout).await {
        Some(addresses) => ResultRow::system(domain, addresses, reason.to_string()),
        None => ResultRow::unresolved(domain, reason.to_string()),
    }
}
