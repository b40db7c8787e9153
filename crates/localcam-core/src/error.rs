//! Error types for the LocalCam core library

use std::io;
use std::net::AddrParseError;
use thiserror::Error;

/// Result type alias for LocalCam operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for discovery and classification operations
///
/// Only [`Error::Cancelled`] and [`Error::InvalidArgument`] ever escape the
/// public scan facade. Everything else is absorbed at the probe or
/// enrichment primitive that produced it and degrades the record instead
/// (a missing fingerprint, an empty ARP map, a closed port verdict).
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-requested termination via the cancellation token
    #[error("Scan cancelled")]
    Cancelled,

    /// Invalid caller-supplied argument (e.g. zero parallelism)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A socket or probe operation went wrong mid-sweep
    #[error("Probe failed: {0}")]
    Network(String),

    /// Operating-system failure outside the sockets themselves, such as
    /// spawning the ARP subprocess
    #[error("System call failed: {0}")]
    Io(#[from] io::Error),

    /// Malformed data from the network or a subprocess: an address that
    /// will not parse, a MAC in an unknown shape, a bad prefix length
    #[error("Malformed input: {0}")]
    Parse(String),
}

impl From<AddrParseError> for Error {
    fn from(err: AddrParseError) -> Self {
        Error::Parse(format!("bad IPv4 literal: {}", err))
    }
}
