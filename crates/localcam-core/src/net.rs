//! IPv4 address model: subnet math and address predicates
//!
//! Everything here is plain `u32` arithmetic over [`Ipv4Addr`]. A
//! [`Subnet`] captures one interface address together with its prefix and
//! default gateways; the rest of the engine derives host ranges, broadcast
//! endpoints and diagnostic labels from it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::net::Ipv4Addr;

/// Network mask for a prefix length, as a host-order `u32`
///
/// `prefix_mask(24) == 0xFFFF_FF00`. Prefix 0 yields an all-zero mask.
pub fn prefix_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len.min(32)))
    }
}

/// APIPA / link-local check (169.254.0.0/16)
pub fn is_apipa(addr: Ipv4Addr) -> bool {
    addr.octets()[0] == 169 && addr.octets()[1] == 254
}

/// Whether an address is a sensible probe target or discovery hint
///
/// Rejects loopback, APIPA, unspecified, multicast and the limited
/// broadcast address. Addresses learned from beacon payloads pass through
/// this before joining the target set.
pub fn is_probe_candidate(addr: Ipv4Addr) -> bool {
    !addr.is_loopback()
        && !is_apipa(addr)
        && !addr.is_unspecified()
        && !addr.is_multicast()
        && !addr.is_broadcast()
}

/// One local IPv4 subnet: the interface address, its network, and the
/// default gateways of the owning interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Address assigned to the local interface
    pub local_addr: Ipv4Addr,
    /// Network address (`local_addr & prefix_mask`)
    pub network: Ipv4Addr,
    /// Prefix length, between 1 and 30
    pub prefix_len: u8,
    /// IPv4 default gateways of the interface, in discovery order
    pub gateways: Vec<Ipv4Addr>,
}

impl Subnet {
    /// Build a subnet from an interface address
    ///
    /// The network address is derived by masking; prefixes outside
    /// `[1, 30]` are rejected (a /31 or /32 has no probeable host range,
    /// /0 is not a LAN).
    pub fn new(local_addr: Ipv4Addr, prefix_len: u8, gateways: Vec<Ipv4Addr>) -> Result<Self> {
        if !(1..=30).contains(&prefix_len) {
            return Err(Error::Parse(format!(
                "prefix length {} outside supported range 1-30",
                prefix_len
            )));
        }
        let network = Ipv4Addr::from(u32::from(local_addr) & prefix_mask(prefix_len));
        Ok(Self {
            local_addr,
            network,
            prefix_len,
            gateways,
        })
    }

    /// Network mask as a `u32`
    pub fn mask(&self) -> u32 {
        prefix_mask(self.prefix_len)
    }

    /// Directed broadcast address (`network | !mask`)
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !self.mask())
    }

    /// First probeable host address (network + 1)
    pub fn first_host(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) + 1)
    }

    /// Last probeable host address (broadcast - 1)
    pub fn last_host(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.broadcast()) - 1)
    }

    /// Number of host addresses (`2^(32-prefix) - 2`)
    pub fn host_count(&self) -> u64 {
        (1u64 << (32 - u32::from(self.prefix_len))) - 2
    }

    /// Whether `addr` falls inside this subnet
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & self.mask() == u32::from(self.network)
    }

    /// Key used for deduplication and ordering
    pub fn key(&self) -> (u32, u8) {
        (u32::from(self.network), self.prefix_len)
    }
}

impl fmt::Display for Subnet {
    /// Diagnostic label: `"<network>/<prefix> (local <ip>[, gateway g1, g2])"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (local {}",
            self.network, self.prefix_len, self.local_addr
        )?;
        if !self.gateways.is_empty() {
            let gws: Vec<String> = self.gateways.iter().map(|g| g.to_string()).collect();
            write!(f, ", gateway {}", gws.join(", "))?;
        }
        write!(f, ")")
    }
}

impl PartialOrd for Subnet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Subnet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
