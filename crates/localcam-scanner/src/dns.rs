//! Reverse DNS enrichment
//!
//! PTR lookups against the system resolver. Hostnames are best-effort
//! decoration for the classifier and the operator; when the system
//! resolver config cannot be loaded, lookups are skipped for the whole
//! sweep rather than pointed at public resolvers that cannot answer local
//! PTR records anyway.

use hickory_resolver::TokioAsyncResolver;
use localcam_core::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Reverse resolver shared across the sweep
pub struct ReverseDnsResolver {
    resolver: Option<TokioAsyncResolver>,
}

impl ReverseDnsResolver {
    /// Build from the system resolver configuration
    pub fn new() -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => Some(resolver),
            Err(e) => {
                warn!(error = %e, "system DNS config unavailable, skipping reverse DNS");
                None
            }
        };
        Self { resolver }
    }

    /// Resolve one address, with a hard per-lookup timeout
    ///
    /// The in-flight query is dropped (and thereby cancelled) when the
    /// timeout fires; any failure yields no hostname. Only cancellation
    /// errors.
    pub async fn lookup(
        &self,
        addr: Ipv4Addr,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        let Some(resolver) = self.resolver.as_ref() else {
            return Ok(None);
        };

        let query = timeout(wait, resolver.reverse_lookup(IpAddr::V4(addr)));
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = query => outcome,
        };

        match outcome {
            Ok(Ok(lookup)) => {
                let Some(name) = lookup.iter().next() else {
                    return Ok(None);
                };
                Ok(Some(name.to_string().trim_end_matches('.').to_string()))
            }
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "reverse DNS lookup failed");
                Ok(None)
            }
            Err(_) => {
                debug!(%addr, "reverse DNS lookup timed out");
                Ok(None)
            }
        }
    }
}

impl Default for ReverseDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}
