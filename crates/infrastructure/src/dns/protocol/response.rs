use httpdns_domain::{normalize_domain, DomainAnswer, ProtocolErrorCode, RecordType, ResolvedBatch};
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_TTL_SECS: u32 = 60;

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    status: i32,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    client_ip: Option<String>,
    #[serde(default)]
    ttl: Option<u32>,
    #[serde(default)]
    expired: Option<u64>,
    #[serde(default)]
    answers: Vec<WireAnswer>,
}

#[derive(Debug, Deserialize)]
struct WireAnswer {
    domain: String,
    #[serde(default)]
    ips: Vec<String>,
    #[serde(default)]
    ttl: Option<u32>,
}

/// Parses a service reply for `record_type`. Addresses of the other family
/// and unparseable entries are dropped.
pub fn parse_response(
    body: &[u8],
    record_type: RecordType,
) -> Result<ResolvedBatch, ProtocolErrorCode> {
    let wire: WireResponse = serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Undecodable HTTPDNS response body");
        ProtocolErrorCode::MalformedBody
    })?;

    if wire.status != 0 {
        debug!(
            status = wire.status,
            msg = wire.msg.as_deref().unwrap_or(""),
            "HTTPDNS service rejected request"
        );
        return Err(ProtocolErrorCode::Service(wire.status));
    }

    let batch_ttl = wire.ttl.unwrap_or(DEFAULT_TTL_SECS);
    let mut answers = Vec::with_capacity(wire.answers.len());

    for answer in wire.answers {
        let domain = normalize_domain(&answer.domain);
        let addresses: Vec<IpAddr> = answer
            .ips
            .iter()
            .filter_map(|raw| match raw.trim().parse::<IpAddr>() {
                Ok(addr) if record_type.matches(&addr) => Some(addr),
                Ok(addr) => {
                    debug!(domain = %domain, address = %addr, record_type = %record_type, "Dropping address of the other family");
                    None
                }
                Err(_) => {
                    debug!(domain = %domain, address = %raw, "Skipping unparseable address");
                    None
                }
            })
            .collect();

        if domain.is_empty() || addresses.is_empty() {
            continue;
        }

        answers.push(DomainAnswer {
            domain: Arc::from(domain),
            addresses,
            ttl: answer.ttl.unwrap_or(batch_ttl),
        });
    }

    if answers.is_empty() {
        return Err(ProtocolErrorCode::MissingAddresses);
    }

    Ok(ResolvedBatch {
        answers,
        ttl: batch_ttl,
        server_expiry: wire.expired,
        client_ip: wire.client_ip.filter(|ip| !ip.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_answers_and_defaults() {
        let body = br#"{
            "status": 0,
            "client_ip": "203.0.113.7",
            "ttl": 120,
            "expired": 1700000300,
            "answers": [
                {"domain": "A.Example.com.", "ips": ["1.2.3.4", "5.6.7.8"], "ttl": 30},
                {"domain": "b.example.com", "ips": ["9.9.9.9"]}
            ]
        }"#;

        let batch = parse_response(body, RecordType::A).unwrap();

        assert_eq!(batch.answers.len(), 2);
        let a = batch.answer_for("a.example.com").unwrap();
        assert_eq!(a.addresses.len(), 2);
        assert_eq!(a.ttl, 30);
        assert_eq!(batch.answer_for("b.example.com").unwrap().ttl, 120);
        assert_eq!(batch.server_expiry, Some(1_700_000_300));
        assert_eq!(batch.client_ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_missing_ttl_defaults_to_sixty() {
        let body = br#"{"answers": [{"domain": "a.example.com", "ips": ["1.2.3.4"]}]}"#;
        let batch = parse_response(body, RecordType::A).unwrap();
        assert_eq!(batch.ttl, 60);
        assert_eq!(batch.answers[0].ttl, 60);
    }

    #[test]
    fn test_bad_and_foreign_addresses_are_dropped() {
        let body = br#"{"answers": [{"domain": "a.example.com", "ips": ["nope", "2001:db8::1", "1.2.3.4"]}]}"#;
        let batch = parse_response(body, RecordType::A).unwrap();
        assert_eq!(batch.answers[0].addresses, vec!["1.2.3.4".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            parse_response(b"<html>", RecordType::A),
            Err(ProtocolErrorCode::MalformedBody)
        );
        assert_eq!(
            parse_response(br#"{"status": 3, "msg": "bad appid"}"#, RecordType::A),
            Err(ProtocolErrorCode::Service(3))
        );
        assert_eq!(
            parse_response(
                br#"{"answers": [{"domain": "a.example.com", "ips": ["garbage"]}]}"#,
                RecordType::A
            ),
            Err(ProtocolErrorCode::MissingAddresses)
        );
        assert_eq!(
            parse_response(br#"{"answers": []}"#, RecordType::Aaaa),
            Err(ProtocolErrorCode::MissingAddresses)
        );
    }
}
