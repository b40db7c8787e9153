//! Result and diagnostics types for camera discovery

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// TCP ports probed on every candidate host
///
/// 80/443/8080/8443: web management; 554/8554: RTSP; 2020: Tapo ONVIF;
/// 20002/9999: TP-Link/Tapo control and legacy discovery.
pub const PROBE_PORTS: [u16; 9] = [80, 443, 554, 2020, 8080, 8443, 8554, 9999, 20002];

/// Evidence gathered about one responsive host
///
/// Built once by the probe orchestrator and immutable afterwards. Hosts
/// that produced no evidence of any kind never get a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProbeResult {
    /// Probed address
    pub ip: Ipv4Addr,
    /// Open TCP ports, strictly ascending, subset of [`PROBE_PORTS`]
    pub open_ports: Vec<u16>,
    /// Concatenated HTTP banner material, if any web port answered
    pub http_fingerprint: Option<String>,
    /// Host answered (or was named by) the ONVIF WS-Discovery beacon
    pub seen_via_onvif: bool,
    /// Host answered (or was named by) the Tapo/TP-Link broadcast beacon
    pub seen_via_tapo_broadcast: bool,
    /// Host answered a direct Tapo UDP probe from its own address
    pub seen_via_tapo_unicast: bool,
}

impl HostProbeResult {
    /// Create a result, normalizing `open_ports` to sorted unique order
    pub fn new(ip: Ipv4Addr, mut open_ports: Vec<u16>) -> Self {
        open_ports.sort_unstable();
        open_ports.dedup();
        Self {
            ip,
            open_ports,
            http_fingerprint: None,
            seen_via_onvif: false,
            seen_via_tapo_broadcast: false,
            seen_via_tapo_unicast: false,
        }
    }

    /// Whether any of the given ports is open
    pub fn any_open(&self, ports: &[u16]) -> bool {
        self.open_ports.iter().any(|p| ports.contains(p))
    }
}

/// A host classified as a likely Tapo camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Host address
    pub ip: Ipv4Addr,
    /// Reverse-DNS name, when resolution succeeded
    pub hostname: Option<String>,
    /// Normalized MAC from the ARP table, when present
    pub mac: Option<String>,
    /// Open TCP ports, ascending
    pub open_ports: Vec<u16>,
    /// Classifier score, rounded to two decimals
    pub confidence: f64,
    /// Human-readable justification, `"; "`-joined clauses
    pub reason: String,
}

/// Per-candidate diagnostics row, emitted for every responsive host
/// regardless of verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDiagnostics {
    /// Host address
    pub ip: Ipv4Addr,
    /// Reverse-DNS name, when resolution succeeded
    pub hostname: Option<String>,
    /// Normalized MAC from the ARP table, when present
    pub mac: Option<String>,
    /// Open TCP ports, ascending
    pub open_ports: Vec<u16>,
    /// ONVIF WS-Discovery evidence bit
    pub seen_via_onvif: bool,
    /// Tapo/TP-Link broadcast evidence bit
    pub seen_via_tapo_broadcast: bool,
    /// Tapo unicast evidence bit
    pub seen_via_tapo_unicast: bool,
    /// Classifier verdict
    pub is_likely: bool,
    /// Classifier score, rounded to two decimals
    pub confidence: f64,
    /// Classifier justification
    pub reason: String,
}

/// Sweep-level diagnostics: counters per phase plus the ranked candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanDiagnostics {
    /// Scanned subnets as `"<network>/<prefix> (local <ip>...)"` labels,
    /// ordered by `(network, prefix)`
    pub subnets_scanned: Vec<String>,
    /// Total deduplicated probe targets (host expansion ∪ ARP ∪ hints)
    pub enumerated_host_count: usize,
    /// ARP entries seeded before probing
    pub arp_seed_count: usize,
    /// Addresses hinted by the ONVIF beacon
    pub onvif_hint_count: usize,
    /// Addresses hinted by the Tapo broadcast beacon
    pub tapo_broadcast_hint_count: usize,
    /// Hosts that answered direct Tapo unicast probes
    pub tapo_unicast_hint_count: usize,
    /// Hosts that produced evidence of any kind
    pub responsive_host_count: usize,
    /// One row per responsive host, ordered by
    /// `(is_likely desc, confidence desc, ip asc)`
    pub candidates: Vec<CandidateDiagnostics>,
}

/// Order candidate rows: likely first, then descending confidence, then
/// ascending address
pub fn sort_candidates(candidates: &mut [CandidateDiagnostics]) {
    candidates.sort_by(|a, b| {
        b.is_likely
            .cmp(&a.is_likely)
            .then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.ip.cmp(&b.ip))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(ip: &str, is_likely: bool, confidence: f64) -> CandidateDiagnostics {
        CandidateDiagnostics {
            ip: ip.parse().unwrap(),
            hostname: None,
            mac: None,
            open_ports: vec![],
            seen_via_onvif: false,
            seen_via_tapo_broadcast: false,
            seen_via_tapo_unicast: false,
            is_likely,
            confidence,
            reason: String::new(),
        }
    }

    #[test]
    fn test_probe_result_normalizes_ports() {
        let result = HostProbeResult::new(
            "192.168.1.9".parse().unwrap(),
            vec![8443, 554, 80, 554, 2020],
        );
        assert_eq!(result.open_ports, vec![80, 554, 2020, 8443]);
    }

    #[test]
    fn test_any_open() {
        let result = HostProbeResult::new("192.168.1.9".parse().unwrap(), vec![554, 2020]);
        assert!(result.any_open(&[554, 8554]));
        assert!(result.any_open(&[2020]));
        assert!(!result.any_open(&[80, 443, 8080, 8443]));
    }

    #[test]
    fn test_candidate_ordering() {
        let mut rows = vec![
            candidate("10.0.0.9", false, 1.5),
            candidate("10.0.0.2", true, 3.5),
            candidate("10.0.0.8", true, 4.5),
            candidate("10.0.0.1", false, 1.5),
            candidate("10.0.0.3", true, 3.5),
        ];
        sort_candidates(&mut rows);

        let order: Vec<(bool, f64, String)> = rows
            .iter()
            .map(|c| (c.is_likely, c.confidence, c.ip.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (true, 4.5, "10.0.0.8".to_string()),
                (true, 3.5, "10.0.0.2".to_string()),
                (true, 3.5, "10.0.0.3".to_string()),
                (false, 1.5, "10.0.0.1".to_string()),
                (false, 1.5, "10.0.0.9".to_string()),
            ]
        );
    }

    #[test]
    fn test_probe_port_set() {
        assert_eq!(PROBE_PORTS.len(), 9);
        let mut sorted = PROBE_PORTS;
        sorted.sort_unstable();
        assert_eq!(sorted, PROBE_PORTS);
    }

    #[test]
    fn test_diagnostics_serialize() {
        let diag = ScanDiagnostics {
            subnets_scanned: vec!["192.168.1.0/24 (local 192.168.1.50)".to_string()],
            enumerated_host_count: 254,
            ..Default::default()
        };
        let json = serde_json::to_string(&diag).unwrap();
        let back: ScanDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }
}
