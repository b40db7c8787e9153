//! LocalCam Core Library
//!
//! Core types, error handling, configuration, and the camera
//! classification rules for the LocalCam discovery engine. This crate is
//! I/O free: it defines what evidence looks like and how evidence turns
//! into a verdict, while `localcam-net` and `localcam-scanner` gather it.
//!
//! # Examples
//!
//! ```
//! use localcam_core::{evaluate, HostProbeResult, ScanConfig};
//!
//! let config = ScanConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let probe = HostProbeResult::new("192.168.1.9".parse().unwrap(), vec![554, 2020]);
//! let eval = evaluate(&probe, None, Some("AC:84:C6:11:22:33"));
//! assert!(eval.is_likely);
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod net;
pub mod oui;
pub mod types;

// Re-export commonly used types
pub use classify::{evaluate, CandidateEvaluation};
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use net::{is_apipa, is_probe_candidate, prefix_mask, Subnet};
pub use oui::{is_tplink_oui, TPLINK_OUIS};
pub use types::{
    sort_candidates, CandidateDiagnostics, Detection, HostProbeResult, ScanDiagnostics,
    PROBE_PORTS,
};
