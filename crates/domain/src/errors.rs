use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid server endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Interface enumeration failed: {0}")]
    InterfaceEnumeration(String),

    #[error("Reachability probe timed out for {target}")]
    ProbeTimeout { target: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
