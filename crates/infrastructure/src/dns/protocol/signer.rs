use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;

/// Canonical string covered by the signature.
pub fn signing_message(
    app_id: &str,
    service_id: u32,
    domains: &str,
    record_type: &str,
    timestamp: u64,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        app_id, service_id, domains, record_type, timestamp
    )
}

/// HMAC-SHA256 over `message`, base64url without padding.
pub fn sign(shared_key: &str, message: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, shared_key.as_bytes());
    let tag = hmac::sign(&key, message.as_bytes());
    URL_SAFE_NO_PAD.encode(tag.as_ref())
}
