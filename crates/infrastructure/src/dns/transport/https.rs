//! HTTPS transport for HTTPDNS queries.
//!
//! Queries are plain GETs with the parameters in the query string; the reply
//! body is JSON.
//!
//! ```text
//! GET /d?dn=a.example.com&type=A&appid=..&openid=..&id=.. HTTP/1.1
//! Accept: application/json
//! ```

use super::{HttpReply, HttpTransport};
use async_trait::async_trait;
use httpdns_domain::DomainError;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Shared client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, DomainError> {
        let response = SHARED_CLIENT
            .get(url)
            .header("Accept", JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| {
                DomainError::IoError(format!("HTTPDNS request failed: {}", e.without_url()))
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                DomainError::IoError(format!(
                    "Failed to read HTTPDNS response: {}",
                    e.without_url()
                ))
            })?;

        debug!(status, response_len = body.len(), "HTTPDNS response received");

        Ok(HttpReply { status, body })
    }
}
