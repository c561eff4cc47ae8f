#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use httpdns_application::ports::{Clock, Credentials, ResolutionRequest};
use httpdns_domain::{DomainError, EncryptionMode, NetworkStack, ServerEndpoint};
use httpdns_infrastructure::dns::{HttpReply, HttpTransport};
use httpdns_infrastructure::system::{InterfaceSource, ReachabilityProbe};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const NOW_UNIX: u64 = 1_700_000_000;

// ── Requests ───────────────────────────────────────────────────────────────

pub fn credentials(token: Option<&str>) -> Arc<Credentials> {
    Arc::new(Credentials {
        app_id: Arc::from("1000"),
        open_id: Arc::from("open-1000"),
        service_id: 42,
        shared_key: Arc::from("secret"),
        token: token.map(Arc::from),
    })
}

pub struct RequestBuilder {
    request: ResolutionRequest,
}

impl RequestBuilder {
    pub fn new(domains: &[&str]) -> Self {
        Self {
            request: ResolutionRequest {
                domains: domains.iter().map(|d| Arc::from(*d)).collect(),
                endpoint: ServerEndpoint::primary("119.29.29.99"),
                stack: NetworkStack::Ipv4Only,
                timeout: Duration::from_secs(2),
                credentials: credentials(None),
                encryption: EncryptionMode::None,
                route_ip: None,
            },
        }
    }

    pub fn endpoint(mut self, address: &str) -> Self {
        self.request.endpoint = ServerEndpoint::primary(address);
        self
    }

    pub fn stack(mut self, stack: NetworkStack) -> Self {
        self.request.stack = stack;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }

    pub fn encryption(mut self, encryption: EncryptionMode) -> Self {
        self.request.encryption = encryption;
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.request.credentials = credentials(Some(token));
        self
    }

    pub fn route_ip(mut self, ip: &str) -> Self {
        self.request.route_ip = Some(Arc::from(ip));
        self
    }

    pub fn build(self) -> ResolutionRequest {
        self.request
    }
}

// ── Clock ──────────────────────────────────────────────────────────────────

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_now(&self) -> u64 {
        NOW_UNIX
    }
}

// ── Transport ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum MockReply {
    Ok { status: u16, body: &'static str },
    Fail(&'static str),
}

/// Replies by record type: the `type=` query parameter picks the reply.
pub struct MockTransport {
    a: Mutex<MockReply>,
    aaaa: Mutex<MockReply>,
    delay: Mutex<Option<Duration>>,
    urls: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            a: Mutex::new(MockReply::Ok {
                status: 200,
                body: r#"{"answers": []}"#,
            }),
            aaaa: Mutex::new(MockReply::Ok {
                status: 200,
                body: r#"{"answers": []}"#,
            }),
            delay: Mutex::new(None),
            urls: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply_a(&self, status: u16, body: &'static str) {
        *self.a.lock().unwrap() = MockReply::Ok { status, body };
    }

    pub fn reply_aaaa(&self, status: u16, body: &'static str) {
        *self.aaaa.lock().unwrap() = MockReply::Ok { status, body };
    }

    pub fn fail_all(&self, reason: &'static str) {
        *self.a.lock().unwrap() = MockReply::Fail(reason);
        *self.aaaa.lock().unwrap() = MockReply::Fail(reason);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = if url.contains("type=AAAA") {
            self.aaaa.lock().unwrap().clone()
        } else {
            self.a.lock().unwrap().clone()
        };

        match reply {
            MockReply::Ok { status, body } => Ok(HttpReply {
                status,
                body: Bytes::from_static(body.as_bytes()),
            }),
            MockReply::Fail(reason) => Err(DomainError::IoError(reason.to_string())),
        }
    }
}

// ── System sources ─────────────────────────────────────────────────────────

pub struct StaticInterfaces {
    result: Result<Vec<IpAddr>, DomainError>,
    calls: AtomicUsize,
}

impl StaticInterfaces {
    pub fn new(addresses: &[&str]) -> Self {
        Self {
            result: Ok(addresses.iter().map(|a| a.parse().unwrap()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(DomainError::InterfaceEnumeration("permission denied".into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InterfaceSource for StaticInterfaces {
    fn addresses(&self) -> Result<Vec<IpAddr>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Succeeds only for the listed targets and records every attempt.
pub struct ScriptedProbe {
    reachable: HashSet<SocketAddr>,
    attempts: Mutex<Vec<SocketAddr>>,
}

impl ScriptedProbe {
    pub fn unreachable() -> Self {
        Self::reaching(&[])
    }

    pub fn reaching(targets: &[&str]) -> Self {
        Self {
            reachable: targets.iter().map(|t| t.parse().unwrap()).collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<SocketAddr> {
        self.attempts.lock().unwrap().clone()
    }
}

impl ReachabilityProbe for ScriptedProbe {
    fn probe(&self, target: SocketAddr) -> Result<(), DomainError> {
        self.attempts.lock().unwrap().push(target);
        if self.reachable.contains(&target) {
            Ok(())
        } else {
            Err(DomainError::IoError("network unreachable".into()))
        }
    }
}
