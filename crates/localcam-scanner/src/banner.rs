//! HTTP banner fingerprinting
//!
//! Fetches a handful of well-known paths from each open web port and
//! concatenates whatever identifies the device: the Server header, the
//! WWW-Authenticate challenge, and the leading body bytes. Tapo firmware
//! answers different paths across generations, hence the path list.
//! Certificate validation is off — camera TLS is always self-signed.

use localcam_core::{Error, Result, ScanConfig};
use std::net::Ipv4Addr;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Paths probed per port, in order
const FINGERPRINT_PATHS: [&str; 4] = ["/", "/index.html", "/mainFrame.htm", "/error.html"];

/// Body bytes folded into the fingerprint per response
const MAX_BODY_BYTES: usize = 8192;

/// Shared HTTP fingerprinter
///
/// One pooled client serves every host in the sweep; its client-wide
/// timeout doubles as the per-host budget.
#[derive(Clone)]
pub struct HttpFingerprinter {
    client: Option<reqwest::Client>,
    budget_ms: u64,
}

impl HttpFingerprinter {
    /// Build the shared client
    ///
    /// Construction failure (broken TLS backend) disables fingerprinting
    /// for the sweep instead of failing it.
    pub fn new(config: &ScanConfig) -> Self {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.http_timeout())
            .user_agent("LocalCam/1.0")
            .build();

        let client = match client {
            Ok(client) => Some(client),
            Err(e) => {
                debug!(error = %e, "HTTP client unavailable, fingerprinting disabled");
                None
            }
        };

        Self {
            client,
            budget_ms: config.http_timeout_ms,
        }
    }

    /// Fetch and concatenate banner material from one port
    ///
    /// Walks the path list under a single host-wide deadline; fragments
    /// from every answered path are joined with single spaces. `None`
    /// means every request errored or nothing identifying came back.
    pub async fn fingerprint(
        &self,
        addr: Ipv4Addr,
        port: u16,
        tls: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let Some(client) = &self.client else {
            return Ok(None);
        };

        let scheme = if tls { "https" } else { "http" };
        let deadline = Instant::now() + std::time::Duration::from_millis(self.budget_ms);
        let mut fragments: Vec<String> = Vec::new();

        for path in FINGERPRINT_PATHS {
            let url = format!("{}://{}:{}{}", scheme, addr, port, path);
            let request = timeout_at(deadline, client.get(&url).send());

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                response = request => response,
            };

            let response = match response {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    trace!(%url, error = %e, "fingerprint request failed");
                    continue;
                }
                // Host-wide budget exhausted; keep whatever we have.
                Err(_) => break,
            };

            for header in ["server", "www-authenticate"] {
                if let Some(value) = response.headers().get(header) {
                    if let Ok(value) = value.to_str() {
                        let value = value.trim();
                        if !value.is_empty() {
                            fragments.push(value.to_string());
                        }
                    }
                }
            }

            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                body = timeout_at(deadline, response.bytes()) => body,
            };
            if let Ok(Ok(bytes)) = body {
                let end = bytes.len().min(MAX_BODY_BYTES);
                let text = String::from_utf8_lossy(&bytes[..end]);
                let text = text.trim();
                if !text.is_empty() {
                    fragments.push(text.to_string());
                }
            }
        }

        if fragments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fragments.join(" ")))
        }
    }
}
