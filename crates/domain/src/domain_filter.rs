/// Lower-cases a domain and strips surrounding whitespace and the trailing root dot.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Decides which domains go through HTTPDNS.
///
/// A pattern matches the domain itself and any of its sub-domains.
/// `no_hijack` always wins; a non-empty `hijack` list turns the filter into
/// an allow-list.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    hijack: Vec<String>,
    no_hijack: Vec<String>,
}

impl DomainFilter {
    pub fn new(hijack: &[String], no_hijack: &[String]) -> Self {
        Self {
            hijack: normalize_patterns(hijack),
            no_hijack: normalize_patterns(no_hijack),
        }
    }

    pub fn allows(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if self.no_hijack.iter().any(|p| matches_suffix(&domain, p)) {
            return false;
        }
        self.hijack.is_empty() || self.hijack.iter().any(|p| matches_suffix(&domain, p))
    }

    pub fn is_empty(&self) -> bool {
        self.hijack.is_empty() && self.no_hijack.is_empty()
    }
}

fn normalize_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| normalize_domain(p.trim_start_matches("*.")))
        .filter(|p| !p.is_empty())
        .collect()
}

fn matches_suffix(domain: &str, pattern: &str) -> bool {
    if domain == pattern {
        return true;
    }
    domain.len() > pattern.len()
        && domain.ends_with(pattern)
        && domain.as_bytes()[domain.len() - pattern.len() - 1] == b'.'
}
