use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::httpdns::HttpDnsConfig;
use super::logging::LoggingConfig;

/// Main configuration structure for the HTTPDNS client
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Service credentials, endpoints and failover policy
    #[serde(default)]
    pub httpdns: HttpDnsConfig,

    /// Resolution cache policy
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. httpdns.toml in current directory
    /// 3. /etc/httpdns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(server) = overrides.primary_server {
            self.httpdns.primary_server = server;
        }
        if let Some(timeout) = overrides.timeout_ms {
            self.httpdns.timeout_ms = timeout;
        }
        if let Some(route_ip) = overrides.route_ip {
            self.httpdns.route_ip = Some(route_ip);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.httpdns.validate()?;

        if self.cache.ttl_ceiling_secs == 0 {
            return Err(ConfigError::Validation(
                "cache ttl_ceiling_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("httpdns.toml").exists() {
            Some("httpdns.toml".to_string())
        } else if std::path::Path::new("/etc/httpdns/config.toml").exists() {
            Some("/etc/httpdns/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub primary_server: Option<String>,
    pub timeout_ms: Option<u64>,
    pub route_ip: Option<String>,
    pub log_level: Option<String>,
}
