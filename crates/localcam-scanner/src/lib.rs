//! LocalCam Scanner Engine
//!
//! Discovery and classification of TP-Link Tapo cameras on the local
//! network. The engine enumerates the machine's IPv4 subnets, gathers
//! multi-modal evidence about every reachable neighbor — TCP port
//! reachability, ICMP liveness, HTTP banners, ONVIF WS-Discovery and
//! Tapo/TP-Link UDP discovery responses, ARP-learned MACs, reverse DNS —
//! and scores each responsive host into a LIKELY/UNLIKELY verdict.
//!
//! # Architecture
//!
//! - [`tcp_probe`], [`ping`], [`udp_probe`], [`banner`]: the per-host
//!   probe primitives
//! - [`beacons`]: the one-to-many ONVIF and Tapo discovery probes
//! - [`hosts`]: subnet expansion and large-prefix sampling
//! - [`dns`]: reverse-DNS enrichment
//! - [`sweep`]: the seven-phase orchestrator behind the public facade
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> localcam_core::Result<()> {
//! let (detections, diagnostics) = localcam_scanner::scan(64).await?;
//! for camera in &detections {
//!     println!("{}  {:.2}  {}", camera.ip, camera.confidence, camera.reason);
//! }
//! println!("{} hosts responded", diagnostics.responsive_host_count);
//! # Ok(())
//! # }
//! ```

pub mod banner;
pub mod beacons;
pub mod dns;
pub mod hosts;
pub mod ping;
pub mod sweep;
pub mod tcp_probe;
pub mod udp_probe;

pub use banner::HttpFingerprinter;
pub use ping::PingProber;
pub use sweep::SweepOutcome;

use localcam_core::{Detection, Result, ScanConfig, ScanDiagnostics};
use sweep::Sweeper;
use tokio_util::sync::CancellationToken;

/// Scan the local network for Tapo cameras
///
/// Returns the detections (ascending by address) together with the full
/// sweep diagnostics. `max_parallelism` bounds the per-host probe
/// fan-out; values below 1 are rejected with
/// [`localcam_core::Error::InvalidArgument`] before any I/O happens.
pub async fn scan(max_parallelism: usize) -> Result<(Vec<Detection>, ScanDiagnostics)> {
    scan_with_cancel(max_parallelism, CancellationToken::new()).await
}

/// [`scan`] with caller-controlled cancellation
///
/// Cancelling the token makes the whole operation fail with
/// [`localcam_core::Error::Cancelled`]; no partial results are returned.
pub async fn scan_with_cancel(
    max_parallelism: usize,
    cancel: CancellationToken,
) -> Result<(Vec<Detection>, ScanDiagnostics)> {
    let config = ScanConfig::with_parallelism(max_parallelism);
    config.validate()?;

    let sweeper = Sweeper::new(config, cancel);
    let outcome = sweeper.run().await?;
    Ok((outcome.detections, outcome.diagnostics))
}

/// Convenience variant returning only the detections
pub async fn find_cameras(max_parallelism: usize) -> Result<Vec<Detection>> {
    let (detections, _) = scan(max_parallelism).await?;
    Ok(detections)
}
