//! Discovery beacons
//!
//! The two one-to-many probes that run before the per-host sweep: an
//! ONVIF WS-Discovery multicast from every local subnet address, and the
//! Tapo/TP-Link discovery matrix over the global and directed broadcast
//! addresses. Both feed a hint set of candidate addresses: the source of
//! every datagram received in the window, plus any IPv4 literal found in
//! the payload text — cameras frequently report their address inside the
//! XML/JSON body rather than answering from it.

use localcam_core::{is_probe_candidate, Error, Result, ScanConfig, Subnet};
use localcam_net::payloads::{
    onvif_probe_envelope, tplink_obfuscate, ONVIF_DISCOVERY_PORT, ONVIF_MULTICAST_ADDR,
    TAPO_DISCOVERY_PAYLOADS, TAPO_DISCOVERY_PORT, TPLINK_LEGACY_PORT,
};
use localcam_net::socket::bind_udp;
use regex::Regex;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

static IPV4_LITERAL: OnceLock<Regex> = OnceLock::new();

fn ipv4_literal_pattern() -> &'static Regex {
    IPV4_LITERAL.get_or_init(|| Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}").expect("static regex"))
}

/// Pull every parseable IPv4 literal out of a payload text
pub fn extract_ipv4_literals(text: &str) -> Vec<Ipv4Addr> {
    ipv4_literal_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Fold one received datagram into the hint set
fn absorb_datagram(hints: &mut HashSet<Ipv4Addr>, source: SocketAddr, payload: &[u8]) {
    if let IpAddr::V4(addr) = source.ip() {
        if is_probe_candidate(addr) {
            hints.insert(addr);
        }
    }
    let text = String::from_utf8_lossy(payload);
    for addr in extract_ipv4_literals(&text) {
        if is_probe_candidate(addr) {
            hints.insert(addr);
        }
    }
}

/// Drain a socket into the hint set until the window elapses
async fn collect_hints(
    socket: &UdpSocket,
    window: Duration,
    cancel: &CancellationToken,
    hints: &mut HashSet<Ipv4Addr>,
) -> Result<()> {
    let deadline = Instant::now() + window;
    let mut buf = [0u8; 4096];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }

        let recv = timeout(remaining, socket.recv_from(&mut buf));
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = recv => outcome,
        };

        match outcome {
            Ok(Ok((len, source))) => {
                trace!(%source, len, "beacon response");
                absorb_datagram(hints, source, &buf[..len]);
            }
            // Receive errors (e.g. ICMP unreachable surfacing on the
            // socket) do not end the window.
            Ok(Err(e)) => trace!(error = %e, "beacon receive error"),
            Err(_) => return Ok(()),
        }
    }
}

/// ONVIF WS-Discovery sweep over every local subnet
///
/// One socket per subnet, bound to the subnet's local address so the
/// multicast probe leaves through the right interface.
pub async fn onvif_discovery(
    subnets: &[Subnet],
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<HashSet<Ipv4Addr>> {
    let probes = subnets.iter().map(|subnet| async {
        let mut hints = HashSet::new();
        let socket = match bind_udp(SocketAddr::from((subnet.local_addr, 0))) {
            Ok(socket) => socket,
            Err(e) => {
                debug!(local = %subnet.local_addr, error = %e, "ONVIF bind failed");
                return Ok(hints);
            }
        };

        let envelope = onvif_probe_envelope();
        let group = SocketAddr::from((ONVIF_MULTICAST_ADDR, ONVIF_DISCOVERY_PORT));
        if let Err(e) = socket.send_to(envelope.as_bytes(), group).await {
            debug!(local = %subnet.local_addr, error = %e, "ONVIF probe send failed");
            return Ok(hints);
        }

        collect_hints(&socket, config.onvif_window(), cancel, &mut hints).await?;
        Ok::<_, Error>(hints)
    });

    let mut all = HashSet::new();
    for hints in futures::future::try_join_all(probes).await? {
        all.extend(hints);
    }
    debug!(count = all.len(), "ONVIF discovery hints");
    Ok(all)
}

/// Tapo/TP-Link broadcast discovery
///
/// Sends every discovery payload to the global broadcast and each
/// subnet's directed broadcast — plain on the Tapo port, obfuscated on
/// the legacy port — then collects replies on the one sending socket.
pub async fn tapo_broadcast_discovery(
    subnets: &[Subnet],
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<HashSet<Ipv4Addr>> {
    let mut hints = HashSet::new();

    let socket = match bind_udp(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))) {
        Ok(socket) => socket,
        Err(e) => {
            debug!(error = %e, "broadcast bind failed");
            return Ok(hints);
        }
    };
    if let Err(e) = socket.set_broadcast(true) {
        debug!(error = %e, "enabling SO_BROADCAST failed");
        return Ok(hints);
    }

    let mut broadcast_addrs: Vec<Ipv4Addr> = vec![Ipv4Addr::BROADCAST];
    for subnet in subnets {
        let directed = subnet.broadcast();
        if !broadcast_addrs.contains(&directed) {
            broadcast_addrs.push(directed);
        }
    }

    for payload in TAPO_DISCOVERY_PAYLOADS {
        let obfuscated = tplink_obfuscate(payload.as_bytes());
        for &addr in &broadcast_addrs {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for (port, body) in [
                (TAPO_DISCOVERY_PORT, payload.as_bytes()),
                (TPLINK_LEGACY_PORT, obfuscated.as_slice()),
            ] {
                if let Err(e) = socket.send_to(body, SocketAddr::from((addr, port))).await {
                    trace!(%addr, port, error = %e, "broadcast send failed");
                }
            }
        }
    }

    collect_hints(&socket, config.tapo_broadcast_window(), cancel, &mut hints).await?;
    debug!(count = hints.len(), "Tapo broadcast hints");
    Ok(hints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ipv4_literals() {
        let text = r#"{"ip":"192.168.4.4","alt":"10.0.0.300","mask":"255.255.255.0"}"#;
        let literals = extract_ipv4_literals(text);

        assert!(literals.contains(&"192.168.4.4".parse().unwrap()));
        assert!(literals.contains(&"255.255.255.0".parse().unwrap()));
        // 10.0.0.300 is not a valid address; the match fails to parse and
        // is dropped rather than truncated.
        assert!(!literals.iter().any(|a| a.octets()[0] == 10));
    }

    #[test]
    fn test_absorb_datagram_unions_source_and_literals() {
        // A reply relayed from 172.16.0.7 naming 192.168.4.4 in its body
        // contributes both addresses.
        let mut hints = HashSet::new();
        absorb_datagram(
            &mut hints,
            "172.16.0.7:3702".parse().unwrap(),
            br#"<XAddrs>http://192.168.4.4:2020/onvif/device_service</XAddrs>"#,
        );

        assert!(hints.contains(&"172.16.0.7".parse().unwrap()));
        assert!(hints.contains(&"192.168.4.4".parse().unwrap()));
        assert_eq!(hints.len(), 2);
    }

    #[test]
    fn test_absorb_datagram_filters_unusable_addresses() {
        let mut hints = HashSet::new();
        absorb_datagram(
            &mut hints,
            "127.0.0.1:9999".parse().unwrap(),
            b"src 169.254.1.1 and 0.0.0.0 and 224.0.0.251",
        );
        assert!(hints.is_empty());
    }

    #[tokio::test]
    async fn test_collect_hints_window_elapses() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let cancel = CancellationToken::new();
        let mut hints = HashSet::new();

        let started = std::time::Instant::now();
        collect_hints(&socket, Duration::from_millis(80), &cancel, &mut hints)
            .await
            .unwrap();

        assert!(hints.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_collect_hints_receives_and_keeps_collecting() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let cancel = CancellationToken::new();
        let mut hints = HashSet::new();

        let collector = collect_hints(&receiver, Duration::from_millis(250), &cancel, &mut hints);
        let producer = async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            sender
                .send_to(b"hello from 192.168.9.9", target)
                .await
                .unwrap();
        };
        let (collected, _) = tokio::join!(collector, producer);
        collected.unwrap();

        // Loopback source is filtered; the payload literal survives.
        assert!(hints.contains(&"192.168.9.9".parse().unwrap()));
        assert_eq!(hints.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_hints_cancelled() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut hints = HashSet::new();

        let result = collect_hints(&socket, Duration::from_secs(5), &cancel, &mut hints).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_onvif_discovery_no_subnets() {
        let cancel = CancellationToken::new();
        let hints = onvif_discovery(&[], &ScanConfig::default(), &cancel)
            .await
            .unwrap();
        assert!(hints.is_empty());
    }
}
