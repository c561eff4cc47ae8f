use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address families the local host can currently reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStack {
    None,
    Ipv4Only,
    Ipv6Only,
    Dual,
}

impl NetworkStack {
    pub fn from_support(ipv4: bool, ipv6: bool) -> Self {
        match (ipv4, ipv6) {
            (true, true) => Self::Dual,
            (true, false) => Self::Ipv4Only,
            (false, true) => Self::Ipv6Only,
            (false, false) => Self::None,
        }
    }

    /// Record types to request from the service for this stack.
    pub fn record_types(&self) -> &'static [RecordType] {
        match self {
            Self::None => &[],
            Self::Ipv4Only => &[RecordType::A],
            Self::Ipv6Only => &[RecordType::Aaaa],
            Self::Dual => &[RecordType::A, RecordType::Aaaa],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ipv4Only => "ipv4",
            Self::Ipv6Only => "ipv6",
            Self::Dual => "dual",
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Ipv4Only => 1,
            Self::Ipv6Only => 2,
            Self::Dual => 3,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Ipv4Only,
            2 => Self::Ipv6Only,
            3 => Self::Dual,
            _ => Self::None,
        }
    }
}

impl fmt::Display for NetworkStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkStack {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ipv4" | "ipv4_only" | "v4" => Ok(Self::Ipv4Only),
            "ipv6" | "ipv6_only" | "v6" => Ok(Self::Ipv6Only),
            "dual" | "dual_stack" => Ok(Self::Dual),
            other => Err(DomainError::ConfigError(format!(
                "Unknown network stack '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
        }
    }

    pub fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            Self::A => addr.is_ipv4(),
            Self::Aaaa => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best IPv6 address class seen on an interface. Unique-local and any other
/// non-global address both count as `Limited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Ipv6Quality {
    #[default]
    None,
    Limited,
    Global,
}

/// Result of a single pass over the local interface addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterfaceSurvey {
    pub ipv4_present: bool,
    pub ipv6_quality: Ipv6Quality,
    pub nat64_suspected: bool,
}

impl InterfaceSurvey {
    pub fn from_addresses<I>(addresses: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let mut survey = Self::default();
        for addr in addresses {
            survey.record(addr);
            if survey.is_complete() {
                break;
            }
        }
        survey
    }

    pub fn record(&mut self, addr: IpAddr) {
        match addr {
            IpAddr::V4(v4) => {
                if is_usable_ipv4(&v4) {
                    self.ipv4_present = true;
                }
            }
            IpAddr::V6(v6) => {
                if is_nat64_synthesized(&v6) {
                    self.nat64_suspected = true;
                    return;
                }
                if let Some(quality) = classify_ipv6(&v6) {
                    self.ipv6_quality = self.ipv6_quality.max(quality);
                }
            }
        }
    }

    /// Nothing recorded after this point can change the survey's outcome.
    pub fn is_complete(&self) -> bool {
        self.ipv4_present && self.ipv6_quality == Ipv6Quality::Global
    }

    pub fn has_native_ipv6(&self) -> bool {
        self.ipv6_quality != Ipv6Quality::None
    }
}

/// Rejects `0.0.0.0/8`, `127.0.0.0/8` and `169.254.0.0/16`.
pub fn is_usable_ipv4(addr: &Ipv4Addr) -> bool {
    let octets = addr.octets();
    !(octets[0] == 0 || octets[0] == 127 || (octets[0] == 169 && octets[1] == 254))
}

/// Well-known NAT64 prefixes: `64:ff9b::/96` (RFC 6052) and `64:ff9b:1::/48` (RFC 8215).
pub fn is_nat64_synthesized(addr: &Ipv6Addr) -> bool {
    let segments = addr.segments();
    if segments[0] != 0x0064 || segments[1] != 0xff9b {
        return false;
    }
    let well_known = segments[2..6].iter().all(|s| *s == 0);
    let local_use = segments[2] == 0x0001;
    well_known || local_use
}

/// Returns `None` for loopback, link-local and unspecified addresses.
pub fn classify_ipv6(addr: &Ipv6Addr) -> Option<Ipv6Quality> {
    if addr.is_loopback() || addr.is_unspecified() {
        return None;
    }
    let first = addr.segments()[0];
    if first & 0xffc0 == 0xfe80 {
        return None;
    }
    if first & 0xe000 == 0x2000 {
        Some(Ipv6Quality::Global)
    } else {
        Some(Ipv6Quality::Limited)
    }
}
