//! Facade contract tests
//!
//! These exercise the argument validation and cancellation guarantees of
//! the public entry points without touching the network: both failure
//! paths must trip before any probing starts.

use localcam_core::Error;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_scan_rejects_zero_parallelism() {
    let result = localcam_scanner::scan(0).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_find_cameras_rejects_zero_parallelism() {
    let result = localcam_scanner::find_cameras(0).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_zero_parallelism_fails_fast() {
    // Validation must happen synchronously, before any socket work; a
    // generous wall-clock bound catches accidental I/O.
    let started = std::time::Instant::now();
    let _ = localcam_scanner::scan(0).await;
    assert!(started.elapsed() < std::time::Duration::from_millis(100));
}

#[tokio::test]
async fn test_pre_cancelled_scan_returns_cancelled() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = localcam_scanner::scan_with_cancel(4, cancel).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_cancelled_scan_yields_no_partial_results() {
    // Cancel shortly after launch: whatever phase the sweep reaches, the
    // outcome must be the cancellation error, never a truncated result.
    let cancel = CancellationToken::new();
    let trip = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trip.cancel();
    });

    let result = localcam_scanner::scan_with_cancel(4, cancel).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}
