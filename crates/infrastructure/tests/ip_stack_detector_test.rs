use httpdns_application::ports::IpStackDetector;
use httpdns_domain::NetworkStack;
use httpdns_infrastructure::system::SystemIpStackDetector;
use std::sync::Arc;

mod helpers;
use helpers::{ScriptedProbe, StaticInterfaces};

const GOOGLE_V4: &str = "8.8.8.8:53";
const CLOUDFLARE_V4: &str = "1.1.1.1:53";
const GOOGLE_V6: &str = "[2001:4860:4860::8888]:53";

fn detect(addresses: &[&str], probe: ScriptedProbe) -> NetworkStack {
    SystemIpStackDetector::with_sources(
        Arc::new(StaticInterfaces::new(addresses)),
        Arc::new(probe),
    )
    .detect()
}

// ── IPv4 ───────────────────────────────────────────────────────────────────

#[test]
fn test_ipv4_without_ipv6_is_ipv4_only() {
    for addresses in [
        &["192.168.1.10"][..],
        &["10.0.0.5", "172.16.0.1"][..],
        &["100.64.0.1", "fe80::1"][..],
    ] {
        assert_eq!(
            detect(addresses, ScriptedProbe::reaching(&[GOOGLE_V4])),
            NetworkStack::Ipv4Only
        );
    }
}

#[test]
fn test_ipv4_interface_is_trusted_when_probes_fail() {
    assert_eq!(
        detect(&["192.168.1.10"], ScriptedProbe::unreachable()),
        NetworkStack::Ipv4Only
    );
}

#[test]
fn test_second_ipv4_target_is_tried() {
    let probe = Arc::new(ScriptedProbe::reaching(&[CLOUDFLARE_V4]));
    let detector = SystemIpStackDetector::with_sources(
        Arc::new(StaticInterfaces::new(&["192.168.1.10"])),
        probe.clone(),
    );

    assert_eq!(detector.detect(), NetworkStack::Ipv4Only);
    let attempts = probe.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].to_string(), GOOGLE_V4);
    assert_eq!(attempts[1].to_string(), CLOUDFLARE_V4);
}

#[test]
fn test_unusable_ipv4_ranges_are_ignored() {
    assert_eq!(
        detect(
            &["0.0.0.1", "127.0.0.1", "169.254.3.4"],
            ScriptedProbe::reaching(&[GOOGLE_V4])
        ),
        NetworkStack::None
    );
}

// ── IPv6 ───────────────────────────────────────────────────────────────────

#[test]
fn test_global_ipv6_with_ipv4_is_dual() {
    assert_eq!(
        detect(
            &["192.168.1.10", "2001:db8:1::10"],
            ScriptedProbe::reaching(&[GOOGLE_V4, GOOGLE_V6])
        ),
        NetworkStack::Dual
    );
}

#[test]
fn test_global_ipv6_is_trusted_when_probes_fail() {
    assert_eq!(
        detect(&["2001:db8:1::10"], ScriptedProbe::unreachable()),
        NetworkStack::Ipv6Only
    );
}

#[test]
fn test_limited_ipv6_requires_a_successful_probe() {
    assert_eq!(
        detect(&["fd00::10"], ScriptedProbe::unreachable()),
        NetworkStack::None
    );
    assert_eq!(
        detect(&["fd00::10"], ScriptedProbe::reaching(&[GOOGLE_V6])),
        NetworkStack::Ipv6Only
    );
}

#[test]
fn test_nat64_only_address_is_not_native_ipv6() {
    assert_eq!(
        detect(
            &["192.168.1.10", "64:ff9b::c000:0201"],
            ScriptedProbe::reaching(&[GOOGLE_V4, GOOGLE_V6])
        ),
        NetworkStack::Ipv4Only
    );
}

#[test]
fn test_link_local_ipv6_is_ignored() {
    assert_eq!(
        detect(&["fe80::1"], ScriptedProbe::reaching(&[GOOGLE_V6])),
        NetworkStack::None
    );
}

// ── Failure modes ──────────────────────────────────────────────────────────

#[test]
fn test_no_interfaces_is_none() {
    assert_eq!(detect(&[], ScriptedProbe::unreachable()), NetworkStack::None);
}

#[test]
fn test_enumeration_failure_is_none() {
    let detector = SystemIpStackDetector::with_sources(
        Arc::new(StaticInterfaces::failing()),
        Arc::new(ScriptedProbe::reaching(&[GOOGLE_V4])),
    );

    assert_eq!(detector.detect(), NetworkStack::None);
}

#[test]
fn test_interfaces_are_enumerated_once_per_detection() {
    let interfaces = Arc::new(StaticInterfaces::new(&["192.168.1.10", "2001:db8::10"]));
    let detector = SystemIpStackDetector::with_sources(
        interfaces.clone(),
        Arc::new(ScriptedProbe::unreachable()),
    );

    detector.detect();

    assert_eq!(interfaces.calls(), 1);
}
