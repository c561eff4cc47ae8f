//! HTTPDNS Domain Layer
pub mod config;
pub mod domain_filter;
pub mod endpoint;
pub mod errors;
pub mod network_stack;
pub mod resolution;

pub use config::{
    CacheConfig, CliOverrides, Config, ConfigError, EncryptionMode, HttpDnsConfig, LoggingConfig,
};
pub use domain_filter::{normalize_domain, DomainFilter};
pub use endpoint::{EndpointRole, ServerEndpoint};
pub use errors::DomainError;
pub use network_stack::{InterfaceSurvey, Ipv6Quality, NetworkStack, RecordType};
pub use resolution::{
    CacheEntry, DomainAnswer, DomainResolution, ProtocolErrorCode, ResolutionOutcome,
    ResolutionSource, ResolvedBatch, UnresolvedReason,
};
