//! LocalCam network facilities
//!
//! Platform-facing building blocks for the discovery engine: interface
//! and subnet enumeration, ARP neighbor-cache resolution, UDP socket
//! construction, and the discovery protocol payloads (Tapo JSON bodies,
//! the TP-Link legacy XOR cipher, the ONVIF WS-Discovery envelope).

pub mod arp;
pub mod interface;
pub mod payloads;
pub mod socket;

pub use arp::{normalize_mac, parse_arp_output, read_arp_table};
pub use interface::{discover_subnets, subnets_from_snapshots, InterfaceSnapshot};
pub use payloads::{
    onvif_probe_envelope, tplink_deobfuscate, tplink_obfuscate, ONVIF_DISCOVERY_PORT,
    ONVIF_MULTICAST_ADDR, TAPO_DISCOVERY_PAYLOADS, TAPO_DISCOVERY_PORT, TPLINK_LEGACY_PORT,
};
pub use socket::bind_udp;
