pub mod cache;
pub mod errors;
pub mod httpdns;
pub mod logging;
pub mod root;

pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use httpdns::{EncryptionMode, HttpDnsConfig};
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
