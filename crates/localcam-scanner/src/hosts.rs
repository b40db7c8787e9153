//! Host enumeration
//!
//! Expands a subnet into the addresses worth probing. Small subnets are
//! walked exhaustively in numeric order. Larger prefixes would explode —
//! a /16 is 65k probes — so they are sampled as up to sixteen /24 chunks
//! biased toward where devices actually live: the /24s around the local
//! address, the gateways, and the edges of the range, topped up with an
//! even stride across the rest. The local address itself is never
//! yielded.

use localcam_core::{ScanConfig, Subnet};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use tracing::debug;

/// Offsets tried around every seed chunk, nearest first
const NEIGHBOR_DELTAS: [i64; 4] = [1, -1, 2, -2];

/// Enumerate probe targets for one subnet
pub fn enumerate_hosts(subnet: &Subnet, config: &ScanConfig) -> Vec<Ipv4Addr> {
    if subnet.host_count() <= config.full_expansion_limit {
        expand_full(subnet)
    } else {
        expand_sampled(subnet, config.max_sampled_chunks)
    }
}

/// Every host address in numeric order, minus the local address
fn expand_full(subnet: &Subnet) -> Vec<Ipv4Addr> {
    let local = u32::from(subnet.local_addr);
    let first = u32::from(subnet.first_host());
    let last = u32::from(subnet.last_host());

    (first..=last)
        .filter(|&raw| raw != local)
        .map(Ipv4Addr::from)
        .collect()
}

/// Sampled expansion: host addresses of the selected /24 chunks,
/// intersected with the subnet range and globally deduplicated
fn expand_sampled(subnet: &Subnet, max_chunks: usize) -> Vec<Ipv4Addr> {
    let local = u32::from(subnet.local_addr);
    let first = u32::from(subnet.first_host());
    let last = u32::from(subnet.last_host());

    let chunks = select_chunks(subnet, max_chunks);
    debug!(subnet = %subnet, chunks = chunks.len(), "sampling large subnet");

    let mut seen: HashSet<u32> = HashSet::new();
    let mut hosts = Vec::new();
    for chunk in chunks {
        for offset in 1..=254u32 {
            let raw = chunk + offset;
            if raw < first || raw > last || raw == local {
                continue;
            }
            if seen.insert(raw) {
                hosts.push(Ipv4Addr::from(raw));
            }
        }
    }
    hosts
}

/// Pick the /24 chunk starts for a sampled sweep
///
/// Seeds in priority order: the local address's /24, each gateway's /24,
/// the first and last host's /24s. Seeds are then grown by their ±1/±2
/// neighbors; this expansion aborts wholesale at the first candidate
/// falling outside the subnet — including the even-stride fill that would
/// follow — so the result can stay below `max_chunks` even when more
/// in-range chunks exist. Callers rely on the selection being
/// deterministic, not on it being maximal.
fn select_chunks(subnet: &Subnet, max_chunks: usize) -> Vec<u32> {
    let chunk_of = |raw: u32| raw & 0xFFFF_FF00;
    let lo = chunk_of(u32::from(subnet.first_host()));
    let hi = chunk_of(u32::from(subnet.last_host()));

    let mut chunks: Vec<u32> = Vec::new();
    let mut push = |chunks: &mut Vec<u32>, candidate: u32| {
        if !chunks.contains(&candidate) {
            chunks.push(candidate);
        }
    };

    push(&mut chunks, chunk_of(u32::from(subnet.local_addr)));
    for gateway in &subnet.gateways {
        push(&mut chunks, chunk_of(u32::from(*gateway)));
    }
    push(&mut chunks, lo);
    push(&mut chunks, hi);

    let seeds = chunks.clone();
    let mut truncated = false;
    'expand: for seed in seeds {
        for delta in NEIGHBOR_DELTAS {
            let candidate = i64::from(seed) + delta * 256;
            if candidate < i64::from(lo) || candidate > i64::from(hi) {
                truncated = true;
                break 'expand;
            }
            if chunks.len() >= max_chunks {
                break 'expand;
            }
            push(&mut chunks, candidate as u32);
        }
    }

    if !truncated && chunks.len() < max_chunks {
        let total = ((hi - lo) / 256 + 1) as u64;
        let remaining = max_chunks - chunks.len();
        for i in 1..=remaining as u64 {
            let index = i * total / (remaining as u64 + 1);
            push(&mut chunks, lo + (index as u32) * 256);
        }
    }

    chunks.truncate(max_chunks);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(local: &str, prefix: u8, gateways: &[&str]) -> Subnet {
        Subnet::new(
            local.parse().unwrap(),
            prefix,
            gateways.iter().map(|g| g.parse().unwrap()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_small_subnet_full_expansion() {
        let net = subnet("192.168.1.50", 24, &["192.168.1.1"]);
        let config = ScanConfig::default();
        let hosts = enumerate_hosts(&net, &config);

        assert_eq!(hosts.len(), 253);
        assert_eq!(hosts[0], "192.168.1.1".parse::<Ipv4Addr>().unwrap());
        assert_eq!(*hosts.last().unwrap(), "192.168.1.254".parse::<Ipv4Addr>().unwrap());
        assert!(!hosts.contains(&"192.168.1.50".parse().unwrap()));
        // Numeric order throughout.
        let mut sorted = hosts.clone();
        sorted.sort();
        assert_eq!(sorted, hosts);
    }

    #[test]
    fn test_tiny_subnet() {
        let net = subnet("10.0.0.1", 30, &["10.0.0.2"]);
        let hosts = enumerate_hosts(&net, &ScanConfig::default());
        // /30 has hosts .1 and .2; the local .1 is skipped.
        assert_eq!(hosts, vec!["10.0.0.2".parse::<Ipv4Addr>().unwrap()]);
    }

    #[test]
    fn test_threshold_boundary_uses_full_expansion() {
        // /20 has 4094 hosts, still within the 4096 limit.
        let net = subnet("10.1.0.50", 20, &["10.1.0.1"]);
        let hosts = enumerate_hosts(&net, &ScanConfig::default());
        assert_eq!(hosts.len(), 4093);
    }

    #[test]
    fn test_slash16_sampled_deterministic() {
        // Local in the first /24: the first out-of-range neighbor
        // (192.167.255.0) aborts the whole expansion, so only the seed
        // chunks plus the +1 neighbor survive — far fewer than sixteen.
        let net = subnet("192.168.0.50", 16, &["192.168.0.1"]);
        let config = ScanConfig::default();

        let hosts = enumerate_hosts(&net, &config);
        let again = enumerate_hosts(&net, &config);
        assert_eq!(hosts, again, "sampling must be deterministic");

        assert!(hosts.len() <= 16 * 254);
        // Seed chunks: 192.168.0.0 (local+gateway+first) and 192.168.255.0
        // (last); neighbor expansion contributes 192.168.1.0, then aborts.
        assert_eq!(hosts.len(), 253 + 254 + 254);

        assert!(hosts.contains(&"192.168.0.1".parse().unwrap()));
        assert!(hosts.contains(&"192.168.0.254".parse().unwrap()));
        assert!(hosts.contains(&"192.168.1.17".parse().unwrap()));
        assert!(hosts.contains(&"192.168.255.254".parse().unwrap()));
        assert!(!hosts.contains(&"192.168.0.50".parse().unwrap()));
        assert!(!hosts.contains(&"192.168.2.1".parse().unwrap()));
    }

    #[test]
    fn test_slash16_mid_range_local_fills_more_chunks() {
        // Local in the middle: its ±1/±2 neighbors are all in range, and
        // the first-host chunk's -1 neighbor aborts the expansion later.
        let net = subnet("10.2.128.10", 16, &["10.2.0.1"]);
        let chunks = select_chunks(&net, 16);

        // Seeds: 10.2.128.0, 10.2.0.0 (gateway+first), 10.2.255.0.
        let c = |s: &str| u32::from(s.parse::<Ipv4Addr>().unwrap());
        assert_eq!(chunks[0], c("10.2.128.0"));
        assert_eq!(chunks[1], c("10.2.0.0"));
        assert_eq!(chunks[2], c("10.2.255.0"));
        // Neighbors of the local chunk land before the abort on
        // 10.1.255.0 (first-host chunk -1).
        assert!(chunks.contains(&c("10.2.129.0")));
        assert!(chunks.contains(&c("10.2.127.0")));
        assert!(chunks.contains(&c("10.2.130.0")));
        assert!(chunks.contains(&c("10.2.126.0")));
        assert!(chunks.contains(&c("10.2.1.0")));
        // The abort leaves the selection short of the sixteen available.
        assert!(chunks.len() < 16);
    }

    #[test]
    fn test_sampled_hosts_respect_subnet_range_and_dedup() {
        let net = subnet("172.20.0.9", 15, &["172.20.0.1"]);
        let hosts = enumerate_hosts(&net, &ScanConfig::default());

        let mut unique: HashSet<&Ipv4Addr> = HashSet::new();
        for host in &hosts {
            assert!(net.contains(*host), "host {} outside subnet", host);
            assert!(unique.insert(host), "host {} duplicated", host);
        }
        assert!(!hosts.contains(&"172.20.0.9".parse().unwrap()));
    }

    #[test]
    fn test_chunk_cap_respected() {
        let net = subnet("10.50.100.10", 16, &["10.50.0.1"]);
        let chunks = select_chunks(&net, 16);
        assert!(chunks.len() <= 16);

        let small_cap = select_chunks(&net, 4);
        assert!(small_cap.len() <= 4);
    }
}
