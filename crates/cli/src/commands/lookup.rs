use super::output::{render_json, render_text, ResultRow};
use crate::di::HttpDnsServices;
use httpdns_domain::normalize_domain;
use tracing::debug;

/// Warms the cache through a normal resolution, then answers every host
/// from the cache alone, the way an embedded lookup hook would.
pub async fn run(services: &HttpDnsServices, hosts: &[String], json: bool) -> anyhow::Result<()> {
    let warmed = services.engine.resolve(hosts.iter()).await;
    debug!(resolved = warmed.values().filter(|r| r.is_resolved()).count(), "Cache warmed");

    let rows: Vec<ResultRow> = hosts
        .iter()
        .map(|host| {
            let host = normalize_domain(host);
            match services.engine.lookup_cached(&host) {
                Some(addresses) => ResultRow {
                    domain: host,
                    source: "cache",
                    addresses: addresses.to_vec(),
                    reason: None,
                },
                None => ResultRow::unresolved(&host, "not cached".to_string()),
            }
        })
        .collect();

    if json {
        println!("{}", render_json(&rows)?);
    } else {
        print!("{}", render_text(&rows));
    }
    Ok(())
}
