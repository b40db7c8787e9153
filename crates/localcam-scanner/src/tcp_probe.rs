//! TCP connect probe
//!
//! Full three-way-handshake probing through the OS socket API — the only
//! TCP evidence source that needs no privileges. A port counts as open
//! only when the handshake completes; refusal, timeout and every other
//! error collapse to closed/filtered. The probe never leaves a socket
//! open: the stream is dropped the moment the verdict is known.

use localcam_core::{Error, Result, ScanConfig};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Probe one TCP port with a fast first attempt and a patient retry
///
/// First attempt uses the short timeout; on any failure the probe waits
/// briefly and tries once more with the long timeout. Only cancellation
/// is an error — network failures mean `false`.
pub async fn tcp_port_open(
    addr: Ipv4Addr,
    port: u16,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<bool> {
    let target = SocketAddr::from((addr, port));

    for (attempt, attempt_timeout) in [config.tcp_timeout(), config.tcp_retry_timeout()]
        .into_iter()
        .enumerate()
    {
        if attempt > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(config.tcp_retry_delay()) => {}
            }
        }

        let connect = timeout(attempt_timeout, TcpStream::connect(target));
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = connect => outcome,
        };

        match outcome {
            Ok(Ok(stream)) => {
                trace!(%target, "TCP handshake completed");
                drop(stream);
                return Ok(true);
            }
            Ok(Err(e)) => {
                trace!(%target, attempt, error = %e, "TCP connect failed");
            }
            Err(_) => {
                trace!(%target, attempt, "TCP connect timed out");
            }
        }
    }

    Ok(false)
}
