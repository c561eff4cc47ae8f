use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Resolves through the operating system resolver, deduplicating addresses
/// but keeping the order the resolver returned them in.
pub async fn lookup(domain: &str, timeout: Duration) -> Option<Vec<IpAddr>> {
    let lookup = tokio::net::lookup_host((domain, 0));
    let addrs = match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(addrs)) => addrs,
        Ok(Err(e)) => {
            debug!(domain = %domain, error = %e, "System DNS lookup failed");
            return None;
        }
        Err(_) => {
            debug!(domain = %domain, "System DNS lookup timed out");
            return None;
        }
    };

    let mut ips: Vec<IpAddr> = Vec::new();
    for addr in addrs {
        if !ips.contains(&addr.ip()) {
            ips.push(addr.ip());
        }
    }
    (!ips.is_empty()).then_some(ips)
}
