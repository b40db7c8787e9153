//! ICMP echo probing
//!
//! Wraps one `surge-ping` client for the whole sweep. Creating the client
//! needs raw-socket (or ping-socket) privileges; when that fails every
//! echo degrades to `false` instead of erroring, because ICMP is only one
//! of several liveness signals and the sweep must survive without it.

use localcam_core::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Echo payload; the content is irrelevant, the reply just has to match
/// our identifier.
const ECHO_PAYLOAD: [u8; 16] = [0u8; 16];

/// Shared ICMP echo prober
#[derive(Clone)]
pub struct PingProber {
    client: Option<Arc<Client>>,
    ident: PingIdentifier,
}

impl PingProber {
    /// Create a prober, degrading gracefully when ICMP sockets are
    /// unavailable
    pub fn new() -> Self {
        let client = match Client::new(&Config::default()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                debug!(error = %e, "ICMP client unavailable, echo probes disabled");
                None
            }
        };
        Self {
            client,
            ident: PingIdentifier(rand::random()),
        }
    }

    /// Whether ICMP echo is actually available on this host
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Send one echo request and wait for a matching reply
    ///
    /// Any non-reply outcome — timeout, unreachable, missing privileges —
    /// is `false`. Only cancellation errors.
    pub async fn echo(
        &self,
        addr: Ipv4Addr,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let Some(client) = &self.client else {
            return Ok(false);
        };

        let mut pinger = client.pinger(IpAddr::V4(addr), self.ident).await;
        let ping = timeout(wait, pinger.ping(PingSequence(0), &ECHO_PAYLOAD));

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = ping => outcome,
        };

        match outcome {
            Ok(Ok(_reply)) => Ok(true),
            Ok(Err(_)) | Err(_) => Ok(false),
        }
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_never_errors_without_cancel() {
        // With or without privileges, a TEST-NET echo resolves to false.
        let prober = PingProber::new();
        let cancel = CancellationToken::new();

        let alive = prober
            .echo(
                "192.0.2.1".parse().unwrap(),
                Duration::from_millis(50),
                &cancel,
            )
            .await
            .unwrap();
        assert!(!alive);
    }

    #[tokio::test]
    async fn test_echo_cancelled() {
        let prober = PingProber::new();
        if !prober.is_enabled() {
            // Without an ICMP socket the cancel arm is never reached; the
            // degraded path returns false before any suspension point.
            return;
        }
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = prober
            .echo(
                "192.0.2.1".parse().unwrap(),
                Duration::from_millis(500),
                &cancel,
            )
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_disabled_prober_is_cheap() {
        let prober = PingProber::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        if !prober.is_enabled() {
            // Degraded prober short-circuits even under cancellation.
            let alive = prober
                .echo(
                    "192.0.2.1".parse().unwrap(),
                    Duration::from_millis(500),
                    &cancel,
                )
                .await
                .unwrap();
            assert!(!alive);
        }
    }
}
