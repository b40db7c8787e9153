//! UDP probe primitives
//!
//! A single request/response exchange from an ephemeral wildcard socket,
//! and on top of it the per-host Tapo unicast probe: every discovery
//! payload is tried plain against the Tapo port and obfuscated against
//! the legacy port, with a short receive window each. A hit counts only
//! when the reply's source is the probed address itself.

use localcam_core::{Error, Result, ScanConfig};
use localcam_net::payloads::{
    tplink_obfuscate, TAPO_DISCOVERY_PAYLOADS, TAPO_DISCOVERY_PORT, TPLINK_LEGACY_PORT,
};
use localcam_net::socket::bind_udp;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Send one datagram and wait for any reply within the window
///
/// Returns the reply's source address and payload, or `None` when the
/// window closes silently or any socket operation fails.
pub async fn udp_exchange(
    target: SocketAddr,
    payload: &[u8],
    window: Duration,
    cancel: &CancellationToken,
) -> Result<Option<(SocketAddr, Vec<u8>)>> {
    let socket = match bind_udp(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))) {
        Ok(socket) => socket,
        Err(e) => {
            trace!(error = %e, "UDP bind failed");
            return Ok(None);
        }
    };

    if let Err(e) = socket.send_to(payload, target).await {
        trace!(%target, error = %e, "UDP send failed");
        return Ok(None);
    }

    let mut buf = [0u8; 2048];
    let recv = timeout(window, socket.recv_from(&mut buf));
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        outcome = recv => outcome,
    };

    match outcome {
        Ok(Ok((len, source))) => Ok(Some((source, buf[..len].to_vec()))),
        Ok(Err(e)) => {
            trace!(%target, error = %e, "UDP receive failed");
            Ok(None)
        }
        Err(_) => Ok(None),
    }
}

/// Direct Tapo/TP-Link UDP probe against one host
///
/// Short-circuits on the first reply whose source equals the probed
/// address; replies from anyone else are ignored.
pub async fn tapo_unicast_probe(
    addr: Ipv4Addr,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<bool> {
    let window = config.tapo_unicast_window();

    for payload in TAPO_DISCOVERY_PAYLOADS {
        let attempts: [(u16, Vec<u8>); 2] = [
            (TAPO_DISCOVERY_PORT, payload.as_bytes().to_vec()),
            (TPLINK_LEGACY_PORT, tplink_obfuscate(payload.as_bytes())),
        ];

        for (port, body) in attempts {
            let target = SocketAddr::from((addr, port));
            if let Some((source, _)) = udp_exchange(target, &body, window, cancel).await? {
                if source.ip() == IpAddr::V4(addr) {
                    trace!(%addr, port, "Tapo unicast probe answered");
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}
