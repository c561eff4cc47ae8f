use async_trait::async_trait;
use httpdns_domain::{EncryptionMode, HttpDnsConfig, NetworkStack, ResolutionOutcome, ServerEndpoint};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Credentials {
    pub app_id: Arc<str>,
    pub open_id: Arc<str>,
    pub service_id: u32,
    pub shared_key: Arc<str>,
    pub token: Option<Arc<str>>,
}

impl Credentials {
    pub fn from_config(config: &HttpDnsConfig) -> Self {
        Self {
            app_id: Arc::from(config.app_id.as_str()),
            open_id: Arc::from(config.open_id.as_str()),
            service_id: config.service_id,
            shared_key: Arc::from(config.shared_key.as_str()),
            token: config.token.as_deref().map(Arc::from),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("open_id", &self.open_id)
            .field("service_id", &self.service_id)
            .field("shared_key", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything one exchange needs. The endpoint is captured by the caller, so a
/// failover switch mid-flight does not redirect this request.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub domains: Vec<Arc<str>>,
    pub endpoint: ServerEndpoint,
    pub stack: NetworkStack,
    pub timeout: Duration,
    pub credentials: Arc<Credentials>,
    pub encryption: EncryptionMode,
    pub route_ip: Option<Arc<str>>,
}

/// One request/response mapping against one endpoint. Never retries.
#[async_trait]
pub trait HttpDnsClient: Send + Sync {
    async fn resolve(&self, request: ResolutionRequest) -> ResolutionOutcome;
}
