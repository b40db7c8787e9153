//! Sweep orchestration
//!
//! Coordinates the full discovery workflow across seven phases:
//!
//! 1. Enumerate subnets and expand them to a host list
//! 2. ARP-prime: ping ahead so the neighbor cache fills up
//! 3. Run the ONVIF and Tapo beacons, read the ARP table
//! 4. Union hosts, ARP entries and beacon hints into the target set
//! 5. Fan out per-host probes under bounded parallelism
//! 6. Re-read the ARP table (probing taught the kernel new neighbors)
//! 7. Walk responsive hosts in address order: reverse DNS, classify,
//!    assemble detections and diagnostics
//!
//! Phase boundaries are also cancellation checkpoints; inside a phase
//! every primitive watches the token itself.

use crate::banner::HttpFingerprinter;
use crate::beacons::{onvif_discovery, tapo_broadcast_discovery};
use crate::dns::ReverseDnsResolver;
use crate::hosts::enumerate_hosts;
use crate::ping::PingProber;
use crate::tcp_probe::tcp_port_open;
use crate::udp_probe::tapo_unicast_probe;
use localcam_core::{
    evaluate, is_probe_candidate, sort_candidates, CandidateDiagnostics, Detection, Error,
    HostProbeResult, Result, ScanConfig, ScanDiagnostics, PROBE_PORTS,
};
use localcam_net::arp::read_arp_table;
use localcam_net::interface::discover_subnets;
use std::collections::{BTreeSet, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Web ports tried for a fingerprint, first open-and-answering wins
const FINGERPRINT_PRIORITY: [(u16, bool); 4] =
    [(80, false), (8080, false), (443, true), (8443, true)];

/// Everything a finished sweep produces
pub struct SweepOutcome {
    /// Hosts classified as likely cameras, ascending by address
    pub detections: Vec<Detection>,
    /// Counters and per-candidate rows for the whole sweep
    pub diagnostics: ScanDiagnostics,
}

/// One sweep's shared state: configuration, cancellation, and the two
/// long-lived probe clients
#[derive(Clone)]
pub(crate) struct Sweeper {
    config: Arc<ScanConfig>,
    cancel: CancellationToken,
    pinger: PingProber,
    http: HttpFingerprinter,
}

impl Sweeper {
    pub(crate) fn new(config: ScanConfig, cancel: CancellationToken) -> Self {
        let pinger = PingProber::new();
        let http = HttpFingerprinter::new(&config);
        Self {
            config: Arc::new(config),
            cancel,
            pinger,
            http,
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Execute the sweep
    pub(crate) async fn run(&self) -> Result<SweepOutcome> {
        self.ensure_active()?;

        // Phase 1: subnets and host expansion.
        let subnets = discover_subnets();
        info!(count = subnets.len(), "enumerated local subnets");

        let mut expanded: Vec<Ipv4Addr> = Vec::new();
        let mut seen: HashSet<Ipv4Addr> = HashSet::new();
        for subnet in &subnets {
            for host in enumerate_hosts(subnet, &self.config) {
                if seen.insert(host) {
                    expanded.push(host);
                }
            }
        }
        debug!(hosts = expanded.len(), "expanded subnet hosts");

        // Phase 2: prime the neighbor cache.
        self.ensure_active()?;
        self.arp_prime(&expanded).await?;

        // Phase 3: beacons in parallel, then the primed ARP table.
        self.ensure_active()?;
        let (onvif_hints, tapo_hints) = tokio::try_join!(
            onvif_discovery(&subnets, &self.config, &self.cancel),
            tapo_broadcast_discovery(&subnets, &self.config, &self.cancel),
        )?;
        let arp_seed = read_arp_table(&self.cancel).await?;
        debug!(
            arp = arp_seed.len(),
            onvif = onvif_hints.len(),
            tapo = tapo_hints.len(),
            "discovery seeds gathered"
        );

        // Phase 4: the probe target set.
        let mut targets: BTreeSet<Ipv4Addr> = expanded.into_iter().collect();
        targets.extend(arp_seed.keys().copied());
        targets.extend(onvif_hints.iter().copied());
        targets.extend(tapo_hints.iter().copied());

        // Phase 5: bounded fan-out.
        self.ensure_active()?;
        let results = self
            .probe_targets(&targets, &onvif_hints, &tapo_hints)
            .await?;

        // Phase 6: final MAC table, post-probe entries override seeds.
        self.ensure_active()?;
        let mut mac_table = arp_seed.clone();
        mac_table.extend(read_arp_table(&self.cancel).await?);

        // Phase 7: strictly sequential enrichment and classification so
        // the output ordering is deterministic.
        let resolver = ReverseDnsResolver::new();
        let mut detections: Vec<Detection> = Vec::new();
        let mut candidates: Vec<CandidateDiagnostics> = Vec::new();
        let mut unicast_hits = 0usize;

        for result in &results {
            self.ensure_active()?;
            if result.seen_via_tapo_unicast {
                unicast_hits += 1;
            }

            let hostname = resolver
                .lookup(result.ip, self.config.reverse_dns_timeout(), &self.cancel)
                .await?;
            let mac = mac_table.get(&result.ip).cloned();
            let eval = evaluate(result, hostname.as_deref(), mac.as_deref());

            debug!(
                ip = %result.ip,
                likely = eval.is_likely,
                score = eval.score,
                "classified candidate"
            );
            candidates.push(CandidateDiagnostics {
                ip: result.ip,
                hostname: hostname.clone(),
                mac: mac.clone(),
                open_ports: result.open_ports.clone(),
                seen_via_onvif: result.seen_via_onvif,
                seen_via_tapo_broadcast: result.seen_via_tapo_broadcast,
                seen_via_tapo_unicast: result.seen_via_tapo_unicast,
                is_likely: eval.is_likely,
                confidence: eval.score,
                reason: eval.reason.clone(),
            });
            if eval.is_likely {
                detections.push(Detection {
                    ip: result.ip,
                    hostname,
                    mac,
                    open_ports: result.open_ports.clone(),
                    confidence: eval.score,
                    reason: eval.reason,
                });
            }
        }
        sort_candidates(&mut candidates);

        let diagnostics = ScanDiagnostics {
            subnets_scanned: subnets.iter().map(|s| s.to_string()).collect(),
            enumerated_host_count: targets.len(),
            arp_seed_count: arp_seed.len(),
            onvif_hint_count: onvif_hints.len(),
            tapo_broadcast_hint_count: tapo_hints.len(),
            tapo_unicast_hint_count: unicast_hits,
            responsive_host_count: results.len(),
            candidates,
        };

        info!(
            detections = detections.len(),
            responsive = results.len(),
            targets = targets.len(),
            "sweep complete"
        );
        Ok(SweepOutcome {
            detections,
            diagnostics,
        })
    }

    /// Ping ahead of the ARP read so the kernel learns its neighbors
    ///
    /// Strictly best-effort: echo outcomes are discarded, only the
    /// requests matter.
    async fn arp_prime(&self, hosts: &[Ipv4Addr]) -> Result<()> {
        if !self.pinger.is_enabled() {
            debug!("ICMP unavailable, skipping ARP priming");
            return Ok(());
        }
        let targets: Vec<Ipv4Addr> = hosts
            .iter()
            .copied()
            .filter(|addr| is_probe_candidate(*addr))
            .take(self.config.arp_prime_limit)
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        debug!(count = targets.len(), "ARP priming");
        let semaphore = Arc::new(Semaphore::new(self.config.arp_prime_parallelism));
        let mut handles = Vec::with_capacity(targets.len());

        for addr in targets {
            if self.cancel.is_cancelled() {
                break;
            }
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::Network(format!("semaphore error: {}", e)))?;
            let pinger = self.pinger.clone();
            let cancel = self.cancel.clone();
            let wait = self.config.arp_prime_timeout();

            handles.push(tokio::spawn(async move {
                let _ = pinger.echo(addr, wait, &cancel).await;
                drop(permit);
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
        self.ensure_active()
    }

    /// Probe every target under the configured parallelism bound
    ///
    /// Results come back in ascending address order because targets are
    /// spawned from an ordered set and collected in spawn order.
    async fn probe_targets(
        &self,
        targets: &BTreeSet<Ipv4Addr>,
        onvif_hints: &HashSet<Ipv4Addr>,
        tapo_hints: &HashSet<Ipv4Addr>,
    ) -> Result<Vec<HostProbeResult>> {
        info!(
            count = targets.len(),
            parallelism = self.config.max_parallelism,
            "probing hosts"
        );
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallelism));
        let mut handles = Vec::with_capacity(targets.len());

        for &addr in targets {
            if self.cancel.is_cancelled() {
                break;
            }
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::Network(format!("semaphore error: {}", e)))?;
            let sweeper = self.clone();
            let onvif_hint = onvif_hints.contains(&addr);
            let tapo_hint = tapo_hints.contains(&addr);

            handles.push(tokio::spawn(async move {
                let outcome = sweeper.probe_host(addr, onvif_hint, tapo_hint).await;
                drop(permit);
                outcome
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(Some(result))) => results.push(result),
                Ok(Ok(None)) => {}
                Ok(Err(Error::Cancelled)) => return Err(Error::Cancelled),
                Ok(Err(e)) => warn!(error = %e, "host probe failed"),
                Err(e) => warn!(error = %e, "probe task join error"),
            }
        }
        self.ensure_active()?;
        Ok(results)
    }

    /// Gather all evidence for one address
    ///
    /// ICMP, the nine TCP ports and the Tapo unicast probe run
    /// concurrently; the HTTP fingerprint only runs for ports seen open.
    /// Returns `None` when the host produced no evidence at all.
    pub(crate) async fn probe_host(
        &self,
        addr: Ipv4Addr,
        onvif_hint: bool,
        tapo_broadcast_hint: bool,
    ) -> Result<Option<HostProbeResult>> {
        let config: &ScanConfig = &self.config;

        let ping = self.pinger.echo(addr, config.ping_timeout(), &self.cancel);
        let ports = futures::future::join_all(PROBE_PORTS.iter().map(|&port| async move {
            (port, tcp_port_open(addr, port, config, &self.cancel).await)
        }));
        let unicast = tapo_unicast_probe(addr, config, &self.cancel);

        let (ping_alive, port_outcomes, unicast_hit) = tokio::join!(ping, ports, unicast);
        let ping_alive = ping_alive?;
        let unicast_hit = unicast_hit?;
        let mut open_ports = Vec::new();
        for (port, outcome) in port_outcomes {
            if outcome? {
                open_ports.push(port);
            }
        }

        if !ping_alive
            && open_ports.is_empty()
            && !onvif_hint
            && !tapo_broadcast_hint
            && !unicast_hit
        {
            return Ok(None);
        }

        let mut result = HostProbeResult::new(addr, open_ports);
        result.seen_via_onvif = onvif_hint;
        result.seen_via_tapo_broadcast = tapo_broadcast_hint;
        result.seen_via_tapo_unicast = unicast_hit;

        for (port, tls) in FINGERPRINT_PRIORITY {
            if !result.open_ports.contains(&port) {
                continue;
            }
            match self.http.fingerprint(addr, port, tls, &self.cancel).await? {
                Some(fingerprint) if !fingerprint.is_empty() => {
                    result.http_fingerprint = Some(fingerprint);
                    break;
                }
                _ => {}
            }
        }

        debug!(
            ip = %addr,
            ports = ?result.open_ports,
            ping = ping_alive,
            unicast = unicast_hit,
            "host responded"
        );
        Ok(Some(result))
    }
}
