//! Network interface enumeration
//!
//! Derives the candidate IPv4 subnets for a sweep from the operating
//! system's interface table. Only interfaces that are up, carry a real
//! IPv4 default gateway, and are neither loopback nor tunnels contribute;
//! their addresses are filtered for loopback/APIPA and usable prefix
//! lengths. Large prefixes are emitted as-is — sampling them down is the
//! host enumerator's job, not ours.

use localcam_core::{is_apipa, Subnet};
use std::net::Ipv4Addr;
use tracing::{debug, trace};

/// Snapshot of one OS interface, decoupled from the `netdev` types so the
/// selection rules can be exercised with fixtures.
#[derive(Debug, Clone, Default)]
pub struct InterfaceSnapshot {
    /// OS interface name
    pub name: String,
    /// Operationally up
    pub is_up: bool,
    /// Loopback interface
    pub is_loopback: bool,
    /// TUN/TAP or point-to-point tunnel
    pub is_tunnel: bool,
    /// IPv4 default gateways (may contain 0.0.0.0 placeholders)
    pub gateways: Vec<Ipv4Addr>,
    /// Unicast IPv4 assignments as `(address, prefix_len)`
    pub addresses: Vec<(Ipv4Addr, u8)>,
}

/// Enumerate the local subnets eligible for scanning
///
/// Never fails: an interface the OS refuses to describe simply does not
/// contribute.
pub fn discover_subnets() -> Vec<Subnet> {
    let snapshots: Vec<InterfaceSnapshot> = netdev::get_interfaces()
        .into_iter()
        .map(|iface| InterfaceSnapshot {
            name: iface.name.clone(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            is_tunnel: iface.is_tun(),
            gateways: iface.gateway.as_ref().map(|gw| gw.ipv4.clone()).unwrap_or_default(),
            addresses: iface
                .ipv4
                .iter()
                .map(|net| (net.addr(), net.prefix_len()))
                .collect(),
        })
        .collect();
    subnets_from_snapshots(snapshots)
}

/// Apply the selection rules to a set of interface snapshots
pub fn subnets_from_snapshots(interfaces: Vec<InterfaceSnapshot>) -> Vec<Subnet> {
    let mut subnets: Vec<Subnet> = Vec::new();

    for iface in interfaces {
        if !iface.is_up || iface.is_loopback || iface.is_tunnel {
            trace!(name = %iface.name, "Skipping down/loopback/tunnel interface");
            continue;
        }

        let gateways: Vec<Ipv4Addr> = iface
            .gateways
            .iter()
            .copied()
            .filter(|gw| !gw.is_unspecified())
            .collect();
        if gateways.is_empty() {
            debug!(name = %iface.name, "Skipping interface without an IPv4 default gateway");
            continue;
        }

        for (addr, prefix_len) in iface.addresses {
            if addr.is_loopback() || is_apipa(addr) {
                trace!(name = %iface.name, %addr, "Skipping loopback/APIPA address");
                continue;
            }
            let subnet = match Subnet::new(addr, prefix_len, gateways.clone()) {
                Ok(s) => s,
                Err(e) => {
                    debug!(name = %iface.name, %addr, prefix_len, error = %e, "Skipping address");
                    continue;
                }
            };
            if !subnets.iter().any(|s| s.key() == subnet.key()) {
                subnets.push(subnet);
            }
        }
    }

    subnets.sort();
    subnets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(
        name: &str,
        gateways: &[&str],
        addresses: &[(&str, u8)],
    ) -> InterfaceSnapshot {
        InterfaceSnapshot {
            name: name.to_string(),
            is_up: true,
            is_loopback: false,
            is_tunnel: false,
            gateways: gateways.iter().map(|g| g.parse().unwrap()).collect(),
            addresses: addresses
                .iter()
                .map(|(a, p)| (a.parse().unwrap(), *p))
                .collect(),
        }
    }

    #[test]
    fn test_basic_subnet_derivation() {
        let subnets = subnets_from_snapshots(vec![iface(
            "eth0",
            &["192.168.1.1"],
            &[("192.168.1.50", 24)],
        )]);

        assert_eq!(subnets.len(), 1);
        assert_eq!(subnets[0].network, "192.168.1.0".parse::<Ipv4Addr>().unwrap());
        assert_eq!(subnets[0].local_addr, "192.168.1.50".parse::<Ipv4Addr>().unwrap());
        assert_eq!(subnets[0].gateways, vec!["192.168.1.1".parse::<Ipv4Addr>().unwrap()]);
    }

    #[test]
    fn test_down_loopback_and_tunnel_skipped() {
        let mut down = iface("eth1", &["10.0.0.1"], &[("10.0.0.2", 24)]);
        down.is_up = false;
        let mut lo = iface("lo", &["10.0.0.1"], &[("127.0.0.1", 8)]);
        lo.is_loopback = true;
        let mut tun = iface("tun0", &["10.8.0.1"], &[("10.8.0.2", 24)]);
        tun.is_tunnel = true;

        assert!(subnets_from_snapshots(vec![down, lo, tun]).is_empty());
    }

    #[test]
    fn test_gateway_required_and_zero_gateway_rejected() {
        let no_gw = iface("eth2", &[], &[("192.168.2.10", 24)]);
        let zero_gw = iface("eth3", &["0.0.0.0"], &[("192.168.3.10", 24)]);

        assert!(subnets_from_snapshots(vec![no_gw, zero_gw]).is_empty());
    }

    #[test]
    fn test_apipa_and_loopback_addresses_skipped() {
        let subnets = subnets_from_snapshots(vec![iface(
            "wlan0",
            &["192.168.1.1"],
            &[("169.254.12.34", 16), ("127.0.0.1", 8), ("192.168.1.60", 24)],
        )]);

        assert_eq!(subnets.len(), 1);
        assert_eq!(subnets[0].local_addr, "192.168.1.60".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn test_prefix_bounds_not_clamped() {
        // /31 and /32 are rejected outright; a /8 stays a /8.
        let subnets = subnets_from_snapshots(vec![iface(
            "eth0",
            &["10.0.0.1"],
            &[("10.1.2.3", 8), ("10.9.9.9", 31), ("10.9.9.10", 32)],
        )]);

        assert_eq!(subnets.len(), 1);
        assert_eq!(subnets[0].prefix_len, 8);
    }

    #[test]
    fn test_deduplication_and_ordering() {
        let subnets = subnets_from_snapshots(vec![
            iface("eth0", &["192.168.1.1"], &[("192.168.1.50", 24)]),
            iface("wlan0", &["192.168.1.1"], &[("192.168.1.51", 24)]),
            iface("eth1", &["10.0.0.1"], &[("10.0.0.5", 16)]),
        ]);

        // Same (network, prefix) from two interfaces collapses to the
        // first one seen; results come back ordered by network.
        assert_eq!(subnets.len(), 2);
        assert_eq!(subnets[0].network, "10.0.0.0".parse::<Ipv4Addr>().unwrap());
        assert_eq!(subnets[1].network, "192.168.1.0".parse::<Ipv4Addr>().unwrap());
        assert_eq!(subnets[1].local_addr, "192.168.1.50".parse::<Ipv4Addr>().unwrap());
    }
}
