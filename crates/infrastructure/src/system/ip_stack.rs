use super::interfaces::{InterfaceSource, SystemInterfaces};
use httpdns_application::ports::IpStackDetector;
use httpdns_domain::{DomainError, InterfaceSurvey, Ipv6Quality, NetworkStack};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on `connect` retries after `EINTR`.
const MAX_PROBE_ATTEMPTS: usize = 10;

const IPV4_PROBE_TARGETS: [SocketAddr; 2] = [
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 53)),
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(1, 1, 1, 1), 53)),
];

const IPV6_PROBE_TARGETS: [SocketAddr; 2] = [
    SocketAddr::V6(SocketAddrV6::new(
        Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888),
        53,
        0,
        0,
    )),
    SocketAddr::V6(SocketAddrV6::new(
        Ipv6Addr::new(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111),
        53,
        0,
        0,
    )),
];

/// Checks whether the host has a route toward `target`.
pub trait ReachabilityProbe: Send + Sync {
    fn probe(&self, target: SocketAddr) -> Result<(), DomainError>;
}

/// Connects an unbound UDP socket. No datagram is sent; the kernel only has
/// to find a route, so an unreachable network fails immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpReachabilityProbe;

impl ReachabilityProbe for UdpReachabilityProbe {
    fn probe(&self, target: SocketAddr) -> Result<(), DomainError> {
        let socket = Socket::new(Domain::for_address(target), Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| DomainError::IoError(e.to_string()))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        let addr = SockAddr::from(target);
        for _ in 0..MAX_PROBE_ATTEMPTS {
            match socket.connect(&addr) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(DomainError::IoError(e.to_string())),
            }
        }

        Err(DomainError::ProbeTimeout {
            target: target.to_string(),
        })
    }
}

/// Classifies the current network from one pass over the interface list and
/// a couple of UDP route probes per family.
pub struct SystemIpStackDetector {
    interfaces: Arc<dyn InterfaceSource>,
    probe: Arc<dyn ReachabilityProbe>,
}

impl SystemIpStackDetector {
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemInterfaces), Arc::new(UdpReachabilityProbe))
    }

    pub fn with_sources(
        interfaces: Arc<dyn InterfaceSource>,
        probe: Arc<dyn ReachabilityProbe>,
    ) -> Self {
        Self { interfaces, probe }
    }

    fn survey(&self) -> Result<InterfaceSurvey, DomainError> {
        let addresses = self.interfaces.addresses()?;
        Ok(InterfaceSurvey::from_addresses(addresses))
    }

    fn probe_any(&self, targets: &[SocketAddr]) -> bool {
        targets.iter().any(|target| match self.probe.probe(*target) {
            Ok(()) => true,
            Err(e) => {
                debug!(target = %target, error = %e, "Reachability probe failed");
                false
            }
        })
    }

    /// Interface presence is enough; the probe only confirms it.
    fn ipv4_supported(&self, survey: &InterfaceSurvey) -> bool {
        if !survey.ipv4_present {
            return false;
        }
        if !self.probe_any(&IPV4_PROBE_TARGETS) {
            debug!("IPv4 probes failed, trusting interface presence");
        }
        true
    }

    fn ipv6_supported(&self, survey: &InterfaceSurvey) -> bool {
        if survey.ipv6_quality == Ipv6Quality::None {
            return false;
        }
        if self.probe_any(&IPV6_PROBE_TARGETS) {
            return true;
        }
        let global = survey.ipv6_quality == Ipv6Quality::Global;
        debug!(
            global,
            "IPv6 probes failed, {}",
            if global {
                "trusting global address"
            } else {
                "limited address only"
            }
        );
        global
    }
}

impl Default for SystemIpStackDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl IpStackDetector for SystemIpStackDetector {
    fn detect(&self) -> NetworkStack {
        let survey = match self.survey() {
            Ok(survey) => survey,
            Err(e) => {
                warn!(error = %e, "Interface enumeration failed, assuming no connectivity");
                return NetworkStack::None;
            }
        };

        if survey.nat64_suspected && !survey.has_native_ipv6() {
            debug!("Only NAT64-synthesized IPv6 addresses present");
        }

        let ipv4 = self.ipv4_supported(&survey);
        let ipv6 = self.ipv6_supported(&survey);
        let stack = NetworkStack::from_support(ipv4, ipv6);

        debug!(
            ipv4_present = survey.ipv4_present,
            ipv6_quality = ?survey.ipv6_quality,
            nat64_suspected = survey.nat64_suspected,
            stack = %stack,
            "Detected IP stack"
        );
        stack
    }
}
