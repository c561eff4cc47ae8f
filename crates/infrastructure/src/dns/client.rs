use super::protocol::{parse_response, QueryBuilder};
use super::transport::{HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use futures::future::join_all;
use httpdns_application::ports::{Clock, HttpDnsClient, ResolutionRequest};
use httpdns_domain::{
    HttpDnsConfig, ProtocolErrorCode, RecordType, ResolutionOutcome, ResolvedBatch,
};
use std::sync::Arc;
use tracing::debug;

/// HTTPDNS protocol client: one GET per record type the stack needs, all
/// bounded together by the request timeout. Never retries.
pub struct HttpsDnsClient {
    transport: Arc<dyn HttpTransport>,
    builder: QueryBuilder,
    clock: Arc<dyn Clock>,
}

impl HttpsDnsClient {
    pub fn new(config: &HttpDnsConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()), clock)
    }

    pub fn with_transport(
        config: &HttpDnsConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            builder: QueryBuilder::from_config(config),
            clock,
        }
    }

    async fn exchange(&self, url: &str, record_type: RecordType) -> ResolutionOutcome {
        let reply = match self.transport.get(url).await {
            Ok(reply) => reply,
            Err(e) => {
                return ResolutionOutcome::TransportError {
                    reason: e.to_string(),
                }
            }
        };

        if !reply.is_success() {
            return ResolutionOutcome::ProtocolError {
                code: ProtocolErrorCode::HttpStatus(reply.status),
            };
        }

        match parse_response(&reply.body, record_type) {
            Ok(batch) => ResolutionOutcome::Success(batch),
            Err(code) => ResolutionOutcome::ProtocolError { code },
        }
    }
}

#[async_trait]
impl HttpDnsClient for HttpsDnsClient {
    async fn resolve(&self, request: ResolutionRequest) -> ResolutionOutcome {
        let record_types = request.stack.record_types();
        if record_types.is_empty() {
            return ResolutionOutcome::ProtocolError {
                code: ProtocolErrorCode::InvalidRequest,
            };
        }

        let timestamp = self.clock.unix_now();
        let mut queries = Vec::with_capacity(record_types.len());
        for record_type in record_types {
            match self.builder.build(&request, *record_type, timestamp) {
                Ok(url) => queries.push((*record_type, url)),
                Err(code) => {
                    debug!(endpoint = %request.endpoint, code = %code, "Refusing to build HTTPDNS query");
                    return ResolutionOutcome::ProtocolError { code };
                }
            }
        }

        debug!(
            endpoint = %request.endpoint,
            domains = request.domains.len(),
            queries = queries.len(),
            timeout_ms = request.timeout.as_millis() as u64,
            "Sending HTTPDNS query"
        );

        let exchanges = join_all(
            queries
                .iter()
                .map(|(record_type, url)| self.exchange(url.as_str(), *record_type)),
        );

        match tokio::time::timeout(request.timeout, exchanges).await {
            Ok(outcomes) => combine(outcomes),
            Err(_) => {
                debug!(endpoint = %request.endpoint, "HTTPDNS query timed out");
                ResolutionOutcome::Timeout
            }
        }
    }
}

/// Folds per-record-type outcomes. A family with no addresses is not an error
/// while another family answered; any other failure fails the whole exchange.
fn combine(outcomes: Vec<ResolutionOutcome>) -> ResolutionOutcome {
    let mut merged: Option<ResolvedBatch> = None;
    let mut missing = None;

    for outcome in outcomes {
        match outcome {
            ResolutionOutcome::Success(batch) => match merged.as_mut() {
                Some(existing) => existing.merge(batch),
                None => merged = Some(batch),
            },
            ResolutionOutcome::ProtocolError {
                code: ProtocolErrorCode::MissingAddresses,
            } => missing = Some(outcome),
            failure => return failure,
        }
    }

    match (merged, missing) {
        (Some(batch), _) => ResolutionOutcome::Success(batch),
        (None, Some(missing)) => missing,
        (None, None) => ResolutionOutcome::ProtocolError {
            code: ProtocolErrorCode::MissingAddresses,
        },
    }
}
