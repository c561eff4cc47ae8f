use super::errors::ConfigError;
use crate::{DomainFilter, ServerEndpoint};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMode {
    /// Parameters are sent as-is.
    None,

    /// Requests carry a timestamp and an HMAC signature over the parameters.
    #[default]
    SignedToken,
}

impl EncryptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SignedToken => "signed_token",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpDnsConfig {
    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub open_id: String,

    #[serde(default)]
    pub service_id: u32,

    #[serde(default)]
    pub shared_key: String,

    /// Static token sent verbatim with every request.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub encryption: EncryptionMode,

    #[serde(default = "default_primary_server")]
    pub primary_server: String,

    #[serde(default)]
    pub backup_servers: Vec<String>,

    #[serde(default = "default_query_path")]
    pub query_path: String,

    /// Consecutive failures before switching to the next backup.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Time on a backup before the next success reverts to the primary.
    #[serde(default = "default_revert_after_secs")]
    pub revert_after_secs: u64,

    #[serde(default = "default_true")]
    pub https_only: bool,

    /// Forced routing IP sent as the `ip` parameter.
    #[serde(default)]
    pub route_ip: Option<String>,

    /// Retry a failed batch once when the failure caused a server switch.
    #[serde(default = "default_true")]
    pub retry_on_switch: bool,

    #[serde(default)]
    pub hijack_domains: Vec<String>,

    #[serde(default)]
    pub no_hijack_domains: Vec<String>,
}

impl HttpDnsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn revert_interval(&self) -> Duration {
        Duration::from_secs(self.revert_after_secs)
    }

    pub fn endpoints(&self) -> Vec<ServerEndpoint> {
        ServerEndpoint::list(&self.primary_server, &self.backup_servers)
    }

    pub fn domain_filter(&self) -> DomainFilter {
        DomainFilter::new(&self.hijack_domains, &self.no_hijack_domains)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_server.trim().is_empty() {
            return Err(ConfigError::Validation(
                "No primary server configured".to_string(),
            ));
        }

        if self.app_id.trim().is_empty() {
            return Err(ConfigError::Validation("app_id cannot be empty".to_string()));
        }

        if self.failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "failure_threshold must be at least 1".to_string(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.encryption == EncryptionMode::SignedToken && self.shared_key.is_empty() {
            return Err(ConfigError::Validation(
                "signed_token encryption requires a shared_key".to_string(),
            ));
        }

        if self.https_only {
            if let Some(endpoint) = self.endpoints().into_iter().find(|e| e.is_plaintext()) {
                return Err(ConfigError::Validation(format!(
                    "https_only is set but server '{}' is plaintext",
                    endpoint.address
                )));
            }
        }

        Ok(())
    }
}

impl Default for HttpDnsConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            open_id: String::new(),
            service_id: 0,
            shared_key: String::new(),
            token: None,
            timeout_ms: default_timeout_ms(),
            encryption: EncryptionMode::default(),
            primary_server: default_primary_server(),
            backup_servers: vec![],
            query_path: default_query_path(),
            failure_threshold: default_failure_threshold(),
            revert_after_secs: default_revert_after_secs(),
            https_only: true,
            route_ip: None,
            retry_on_switch: true,
            hijack_domains: vec![],
            no_hijack_domains: vec![],
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_primary_server() -> String {
    "119.29.29.99".to_string()
}

fn default_query_path() -> String {
    "/d".to_string()
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_revert_after_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}
