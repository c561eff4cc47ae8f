use super::signer::{sign, signing_message};
use httpdns_application::ports::ResolutionRequest;
use httpdns_domain::{EncryptionMode, HttpDnsConfig, ProtocolErrorCode, RecordType, ServerEndpoint};
use reqwest::Url;
use std::net::Ipv6Addr;

/// Builds the query URL for one record type of a resolution request.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query_path: String,
    https_only: bool,
}

impl QueryBuilder {
    pub fn new(query_path: &str, https_only: bool) -> Self {
        let trimmed = query_path.trim();
        let query_path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self {
            query_path,
            https_only,
        }
    }

    pub fn from_config(config: &HttpDnsConfig) -> Self {
        Self::new(&config.query_path, config.https_only)
    }

    pub fn build(
        &self,
        request: &ResolutionRequest,
        record_type: RecordType,
        timestamp: u64,
    ) -> Result<Url, ProtocolErrorCode> {
        if request.domains.is_empty() {
            return Err(ProtocolErrorCode::InvalidRequest);
        }

        let base = self.base_url(&request.endpoint)?;
        let mut url = Url::parse(&format!("{}{}", base, self.query_path))
            .map_err(|_| ProtocolErrorCode::InvalidRequest)?;

        let domains = request
            .domains
            .iter()
            .map(|d| d.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        let credentials = &request.credentials;
        let service_id = credentials.service_id.to_string();

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dn", &domains)
                .append_pair("type", record_type.as_str())
                .append_pair("appid", &credentials.app_id)
                .append_pair("openid", &credentials.open_id)
                .append_pair("id", &service_id);

            if let Some(route_ip) = request.route_ip.as_deref() {
                query.append_pair("ip", route_ip);
            }
            if let Some(token) = credentials.token.as_deref() {
                query.append_pair("token", token);
            }

            if request.encryption == EncryptionMode::SignedToken {
                let message = signing_message(
                    &credentials.app_id,
                    credentials.service_id,
                    &domains,
                    record_type.as_str(),
                    timestamp,
                );
                query
                    .append_pair("timestamp", &timestamp.to_string())
                    .append_pair("sign", &sign(&credentials.shared_key, &message));
            }
        }

        Ok(url)
    }

    fn base_url(&self, endpoint: &ServerEndpoint) -> Result<String, ProtocolErrorCode> {
        let scheme = endpoint
            .scheme()
            .map_or_else(|| "https".to_string(), str::to_ascii_lowercase);
        let host = endpoint.host().trim();

        match scheme.as_str() {
            "https" => {}
            "http" if self.https_only => return Err(ProtocolErrorCode::InsecureEndpoint),
            "http" => {}
            _ => return Err(ProtocolErrorCode::InvalidRequest),
        }

        // Bare IPv6 literals need brackets in a URL authority.
        if host.parse::<Ipv6Addr>().is_ok() {
            Ok(format!("{}://[{}]", scheme, host))
        } else {
            Ok(format!("{}://{}", scheme, host))
        }
    }
}
