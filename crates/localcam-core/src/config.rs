//! Scan configuration for LocalCam

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scan configuration
///
/// Holds every tunable of the sweep: timeouts for the individual probe
/// primitives, receive windows for the discovery beacons, and the fan-out
/// bounds. [`ScanConfig::default`] carries the production constants; tests
/// shrink the windows to keep fixtures fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum concurrent per-host probe tasks
    pub max_parallelism: usize,
    /// TCP connect timeout for the first attempt, in milliseconds
    pub tcp_timeout_ms: u64,
    /// Pause between the first and second TCP connect attempt
    pub tcp_retry_delay_ms: u64,
    /// TCP connect timeout for the retry attempt
    pub tcp_retry_timeout_ms: u64,
    /// ICMP echo timeout during host probing
    pub ping_timeout_ms: u64,
    /// ICMP echo timeout during the ARP-priming sweep
    pub arp_prime_timeout_ms: u64,
    /// Maximum addresses pinged during ARP priming
    pub arp_prime_limit: usize,
    /// Concurrent pings during ARP priming
    pub arp_prime_parallelism: usize,
    /// Receive window for per-host Tapo unicast probes
    pub tapo_unicast_window_ms: u64,
    /// Receive window for the ONVIF WS-Discovery beacon
    pub onvif_window_ms: u64,
    /// Receive window for the Tapo/TP-Link broadcast beacon
    pub tapo_broadcast_window_ms: u64,
    /// Total per-host HTTP fingerprint budget
    pub http_timeout_ms: u64,
    /// Reverse DNS lookup timeout
    pub reverse_dns_timeout_ms: u64,
    /// Subnets with at most this many hosts are expanded exhaustively
    pub full_expansion_limit: u64,
    /// Maximum sampled /24 chunks for larger subnets
    pub max_sampled_chunks: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 64,
            tcp_timeout_ms: 450,
            tcp_retry_delay_ms: 40,
            tcp_retry_timeout_ms: 1300,
            ping_timeout_ms: 450,
            arp_prime_timeout_ms: 170,
            arp_prime_limit: 2048,
            arp_prime_parallelism: 192,
            tapo_unicast_window_ms: 260,
            onvif_window_ms: 1800,
            tapo_broadcast_window_ms: 2200,
            http_timeout_ms: 2600,
            reverse_dns_timeout_ms: 700,
            full_expansion_limit: 4096,
            max_sampled_chunks: 16,
        }
    }
}

impl ScanConfig {
    /// Create a configuration with the given per-host parallelism
    pub fn with_parallelism(max_parallelism: usize) -> Self {
        Self {
            max_parallelism,
            ..Self::default()
        }
    }

    /// Validate configuration
    ///
    /// Rejects `max_parallelism < 1`. The other knobs have no hard bounds;
    /// a zero timeout merely makes the corresponding probe always miss.
    pub fn validate(&self) -> Result<()> {
        if self.max_parallelism < 1 {
            return Err(Error::InvalidArgument(
                "max_parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// First-attempt TCP connect timeout
    pub fn tcp_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_timeout_ms)
    }

    /// Pause before the TCP retry
    pub fn tcp_retry_delay(&self) -> Duration {
        Duration::from_millis(self.tcp_retry_delay_ms)
    }

    /// Retry TCP connect timeout
    pub fn tcp_retry_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_retry_timeout_ms)
    }

    /// ICMP echo timeout for host probing
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    /// ICMP echo timeout for ARP priming
    pub fn arp_prime_timeout(&self) -> Duration {
        Duration::from_millis(self.arp_prime_timeout_ms)
    }

    /// Tapo unicast receive window
    pub fn tapo_unicast_window(&self) -> Duration {
        Duration::from_millis(self.tapo_unicast_window_ms)
    }

    /// ONVIF WS-Discovery receive window
    pub fn onvif_window(&self) -> Duration {
        Duration::from_millis(self.onvif_window_ms)
    }

    /// Tapo broadcast receive window
    pub fn tapo_broadcast_window(&self) -> Duration {
        Duration::from_millis(self.tapo_broadcast_window_ms)
    }

    /// Total HTTP fingerprint budget per host
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Reverse DNS timeout
    pub fn reverse_dns_timeout(&self) -> Duration {
        Duration::from_millis(self.reverse_dns_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_parallelism, 64);
        assert_eq!(config.tcp_timeout(), Duration::from_millis(450));
        assert_eq!(config.tapo_broadcast_window(), Duration::from_millis(2200));
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let config = ScanConfig::with_parallelism(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_with_parallelism_keeps_other_defaults() {
        let config = ScanConfig::with_parallelism(8);
        assert_eq!(config.max_parallelism, 8);
        assert_eq!(config.arp_prime_parallelism, 192);
        assert_eq!(config.full_expansion_limit, 4096);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ScanConfig::with_parallelism(17);
        let json = serde_json::to_string(&config).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_parallelism, 17);
        assert_eq!(back.onvif_window_ms, config.onvif_window_ms);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let back: ScanConfig = serde_json::from_str(r#"{"max_parallelism": 3}"#).unwrap();
        assert_eq!(back.max_parallelism, 3);
        assert_eq!(back.tcp_timeout_ms, 450);
        assert_eq!(back.max_sampled_chunks, 16);
    }
}
