//! ARP table resolution
//!
//! Reads the OS neighbor cache by spawning `arp -a` and parsing its
//! line-oriented output. The tool's format is stable enough across
//! platforms for a single regex; where a platform disagrees the resolver
//! degrades to an empty map rather than guessing. Missing binaries,
//! permission errors and malformed lines are all non-fatal — only
//! cancellation propagates.

use localcam_core::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// `IPv4  MAC  word` with 17-char colon/hyphen MACs
static ARP_LINE: OnceLock<Regex> = OnceLock::new();

fn arp_line_pattern() -> &'static Regex {
    ARP_LINE.get_or_init(|| {
        Regex::new(r"^\s*(?P<ip>\d{1,3}(?:\.\d{1,3}){3})\s+(?P<mac>[0-9a-fA-F\-:]{17})\s+\w+")
            .expect("static regex")
    })
}

/// Read the neighbor cache via `arp -a`
///
/// Returns `ip → normalized MAC`. Every failure mode except cancellation
/// yields an empty map.
pub async fn read_arp_table(cancel: &CancellationToken) -> Result<HashMap<Ipv4Addr, String>> {
    let child = Command::new("arp")
        .arg("-a")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => {
            debug!(error = %e, "arp command unavailable, continuing without MAC data");
            return Ok(HashMap::new());
        }
    };

    let output = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        output = child.wait_with_output() => output,
    };

    match output {
        Ok(output) => Ok(parse_arp_output(&String::from_utf8_lossy(&output.stdout))),
        Err(e) => {
            debug!(error = %e, "arp command failed, continuing without MAC data");
            Ok(HashMap::new())
        }
    }
}

/// Parse `arp -a` output into an `ip → normalized MAC` map
pub fn parse_arp_output(output: &str) -> HashMap<Ipv4Addr, String> {
    let mut table = HashMap::new();

    for line in output.lines() {
        let Some(caps) = arp_line_pattern().captures(line) else {
            continue;
        };
        let Ok(ip) = caps["ip"].parse::<Ipv4Addr>() else {
            continue;
        };
        let Some(mac) = normalize_mac(&caps["mac"]) else {
            continue;
        };
        table.insert(ip, mac);
    }

    table
}

/// Normalize a MAC to uppercase colon-delimited form
///
/// Accepts colon or hyphen separators; anything that is not six two-digit
/// hex groups is rejected.
pub fn normalize_mac(mac: &str) -> Option<String> {
    let groups: Vec<&str> = mac.split(|c| c == ':' || c == '-').collect();
    if groups.len() != 6 {
        return None;
    }
    let mut normalized = Vec::with_capacity(6);
    for group in groups {
        if group.len() != 2 || !group.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        normalized.push(group.to_ascii_uppercase());
    }
    Some(normalized.join(":"))
}
