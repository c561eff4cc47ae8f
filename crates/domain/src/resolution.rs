use crate::NetworkStack;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

/// Addresses the service returned for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAnswer {
    pub domain: Arc<str>,
    pub addresses: Vec<IpAddr>,
    pub ttl: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBatch {
    pub answers: Vec<DomainAnswer>,
    /// Batch-level TTL in seconds; per-answer TTLs fall back to it.
    pub ttl: u32,
    /// Server-declared expiry as unix seconds.
    pub server_expiry: Option<u64>,
    pub client_ip: Option<String>,
}

impl ResolvedBatch {
    pub fn answer_for(&self, domain: &str) -> Option<&DomainAnswer> {
        self.answers
            .iter()
            .find(|a| a.domain.eq_ignore_ascii_case(domain))
    }

    /// Folds another batch (e.g. the AAAA half of a dual-stack query) into this one.
    pub fn merge(&mut self, other: ResolvedBatch) {
        for answer in other.answers {
            match self
                .answers
                .iter_mut()
                .find(|a| a.domain.eq_ignore_ascii_case(&answer.domain))
            {
                Some(existing) => {
                    for addr in answer.addresses {
                        if !existing.addresses.contains(&addr) {
                            existing.addresses.push(addr);
                        }
                    }
                    existing.ttl = existing.ttl.min(answer.ttl);
                }
                None => self.answers.push(answer),
            }
        }
        self.ttl = self.ttl.min(other.ttl);
        self.server_expiry = match (self.server_expiry, other.server_expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if self.client_ip.is_none() {
            self.client_ip = other.client_ip;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolErrorCode {
    HttpStatus(u16),
    Service(i32),
    MalformedBody,
    MissingAddresses,
    InsecureEndpoint,
    InvalidRequest,
}

impl fmt::Display for ProtocolErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "http status {}", status),
            Self::Service(code) => write!(f, "service status {}", code),
            Self::MalformedBody => f.write_str("malformed body"),
            Self::MissingAddresses => f.write_str("missing addresses"),
            Self::InsecureEndpoint => f.write_str("plaintext endpoint refused"),
            Self::InvalidRequest => f.write_str("invalid request"),
        }
    }
}

/// Result of one protocol exchange with an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Success(ResolvedBatch),
    Timeout,
    TransportError { reason: String },
    ProtocolError { code: ProtocolErrorCode },
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure_reason(&self) -> Option<UnresolvedReason> {
        match self {
            Self::Success(_) => None,
            Self::Timeout => Some(UnresolvedReason::Timeout),
            Self::TransportError { .. } => Some(UnresolvedReason::Transport),
            Self::ProtocolError { code } => Some(UnresolvedReason::Protocol(*code)),
        }
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(batch) => write!(f, "success ({} answers)", batch.answers.len()),
            Self::Timeout => f.write_str("timeout"),
            Self::TransportError { reason } => write!(f, "transport error: {}", reason),
            Self::ProtocolError { code } => write!(f, "protocol error: {}", code),
        }
    }
}

/// Cached addresses for one `(domain, stack)` key. Replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub domain: Arc<str>,
    pub stack: NetworkStack,
    pub addresses: Arc<[IpAddr]>,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(
        domain: impl Into<Arc<str>>,
        stack: NetworkStack,
        addresses: Vec<IpAddr>,
        expires_at: Instant,
    ) -> Self {
        Self {
            domain: domain.into(),
            stack,
            addresses: Arc::from(addresses),
            expires_at,
        }
    }

    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    Cache,
    Network,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnresolvedReason {
    /// Filtered out by the hijack / no-hijack lists.
    Excluded,
    NoConnectivity,
    Timeout,
    Transport,
    Protocol(ProtocolErrorCode),
    /// The exchange succeeded but carried no addresses for this domain.
    NotInResponse,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded => f.write_str("excluded"),
            Self::NoConnectivity => f.write_str("no connectivity"),
            Self::Timeout => f.write_str("timeout"),
            Self::Transport => f.write_str("transport error"),
            Self::Protocol(code) => write!(f, "protocol error ({})", code),
            Self::NotInResponse => f.write_str("not in response"),
        }
    }
}

/// Per-domain result of a resolution burst. Callers fall back to system DNS
/// for anything `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainResolution {
    Resolved {
        addresses: Arc<[IpAddr]>,
        source: ResolutionSource,
    },
    Unresolved(UnresolvedReason),
}

impl DomainResolution {
    pub fn addresses(&self) -> Option<&[IpAddr]> {
        match self {
            Self::Resolved { addresses, .. } => Some(addresses),
            Self::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}
