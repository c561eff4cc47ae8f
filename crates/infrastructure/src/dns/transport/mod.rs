pub mod https;

use async_trait::async_trait;
use bytes::Bytes;
use httpdns_domain::DomainError;

pub use https::ReqwestTransport;

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one GET. Timeouts are the caller's concern.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpReply, DomainError>;
}
