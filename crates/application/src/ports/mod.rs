mod clock;
mod http_dns_client;
mod ip_stack_detector;
mod resolution_cache;

pub use clock::Clock;
pub use http_dns_client::{Credentials, HttpDnsClient, ResolutionRequest};
pub use ip_stack_detector::IpStackDetector;
pub use resolution_cache::ResolutionCachePort;
