use httpdns_domain::{DomainResolution, ResolutionSource};
use serde::Serialize;
use std::net::IpAddr;

/// One line of `resolve` / `lookup` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub domain: String,
    pub source: &'static str,
    pub addresses: Vec<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ResultRow {
    pub fn from_resolution(domain: &str, resolution: &DomainResolution) -> Self {
        match resolution {
            DomainResolution::Resolved { addresses, source } => Self {
                domain: domain.to_string(),
                source: source_label(*source),
                addresses: addresses.to_vec(),
                reason: None,
            },
            DomainResolution::Unresolved(reason) => Self::unresolved(domain, reason.to_string()),
        }
    }

    pub fn unresolved(domain: &str, reason: String) -> Self {
        Self {
            domain: domain.to_string(),
            source: "unresolved",
            addresses: Vec::new(),
            reason: Some(reason),
        }
    }

    /// Keeps the HTTPDNS failure reason next to the system answer.
    pub fn system(domain: &str, addresses: Vec<IpAddr>, reason: String) -> Self {
        Self {
            domain: domain.to_string(),
            source: "system",
            addresses,
            reason: Some(reason),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.addresses.is_empty()
    }
}

pub fn source_label(source: ResolutionSource) -> &'static str {
    match source {
        ResolutionSource::Cache => "cache",
        ResolutionSource::Network => "httpdns",
        ResolutionSource::Stale => "stale",
    }
}

pub fn render_text(rows: &[ResultRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.domain);
        out.push('\t');
        out.push_str(row.source);
        out.push('\t');
        if row.is_resolved() {
            let ips: Vec<String> = row.addresses.iter().map(ToString::to_string).collect();
            out.push_str(&ips.join(","));
        }
        if let Some(reason) = &row.reason {
            if row.is_resolved() {
                out.push('\t');
            }
            out.push('(');
            out.push_str(reason);
            out.push(')');
        }
        out.push('\n');
    }
    out
}

pub fn render_json(rows: &[ResultRow]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
