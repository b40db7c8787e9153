//! Camera classification rules
//!
//! Turns one [`HostProbeResult`] plus its ARP/DNS enrichment into a
//! LIKELY/UNLIKELY verdict with a weighted score and a justification
//! string. The rules are additive: each piece of evidence contributes a
//! fixed weight and a clause, missing evidence simply contributes nothing.
//! Repeater/router web UIs are the one source of negative evidence — they
//! share TP-Link branding with the cameras and would otherwise pass on
//! brand markers alone.

use crate::oui::is_tplink_oui;
use crate::types::HostProbeResult;
use serde::{Deserialize, Serialize};

/// RTSP streaming ports
const RTSP_PORTS: [u16; 2] = [554, 8554];
/// Tapo ONVIF service port
const ONVIF_PORT: u16 = 2020;
/// TP-Link/Tapo control and legacy discovery ports
const CONTROL_PORTS: [u16; 2] = [20002, 9999];
/// Web management ports
const WEB_PORTS: [u16; 4] = [80, 443, 8080, 8443];

/// Positive brand markers in fingerprints and hostnames
const BRAND_MARKERS: [&str; 3] = ["tapo", "tp-link", "tplink"];
/// Markers of TP-Link repeater/router web UIs (negative evidence)
const REPEATER_MARKERS: [&str; 3] = ["tplinkrepeater", "mwlogin", "repeater"];

/// Classifier output for one candidate host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    /// Verdict: promote to a detection or keep as diagnostics only
    pub is_likely: bool,
    /// Evidence score, rounded to two decimals
    pub score: f64,
    /// `"; "`-joined justification clauses
    pub reason: String,
}

/// Evaluate one probed host
///
/// `hostname` and `mac` are the reverse-DNS and ARP enrichments; either
/// may be absent without affecting the other contributions.
pub fn evaluate(
    probe: &HostProbeResult,
    hostname: Option<&str>,
    mac: Option<&str>,
) -> CandidateEvaluation {
    let fingerprint = probe
        .http_fingerprint
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let looks_like_repeater = !fingerprint.is_empty()
        && REPEATER_MARKERS.iter().any(|m| fingerprint.contains(m));
    // A repeater UI mentions "tplink" too; the repeater match consumes the
    // brand marker so the same substring cannot score both ways.
    let fingerprint_brand = !looks_like_repeater
        && !fingerprint.is_empty()
        && BRAND_MARKERS.iter().any(|m| fingerprint.contains(m));

    let hostname_lower = hostname.unwrap_or_default().to_ascii_lowercase();
    let hostname_brand = BRAND_MARKERS.iter().any(|m| hostname_lower.contains(m));
    let tplink_oui = mac.map(is_tplink_oui).unwrap_or(false);

    let rtsp_open = probe.any_open(&RTSP_PORTS);
    let onvif_port_open = probe.open_ports.contains(&ONVIF_PORT);
    let control_open = probe.any_open(&CONTROL_PORTS);
    let web_open = probe.any_open(&WEB_PORTS);

    let mut score = 0.0f64;
    let mut clauses: Vec<String> = Vec::new();
    let mut add = |score: &mut f64, delta: f64, clause: String| {
        *score += delta;
        clauses.push(clause);
    };

    if rtsp_open {
        add(&mut score, 2.0, "RTSP service port is open".to_string());
    }
    if onvif_port_open {
        add(&mut score, 1.5, "ONVIF port 2020 is open".to_string());
    }
    if probe.seen_via_onvif {
        add(
            &mut score,
            2.0,
            "Responded to ONVIF WS-Discovery probe".to_string(),
        );
    }
    if probe.seen_via_tapo_broadcast {
        add(
            &mut score,
            2.0,
            "Responded to TP-Link/Tapo local discovery probe".to_string(),
        );
    }
    if probe.seen_via_tapo_unicast {
        add(
            &mut score,
            2.5,
            "Responded to direct TP-Link/Tapo UDP probe".to_string(),
        );
    }
    if control_open {
        add(
            &mut score,
            1.0,
            "TP-Link/Tapo control port is open (20002/9999)".to_string(),
        );
    }
    if web_open {
        add(&mut score, 0.5, "Web management port is open".to_string());
    }
    if fingerprint_brand {
        add(
            &mut score,
            3.0,
            "HTTP endpoint reports Tapo/TP-Link markers".to_string(),
        );
    }
    if looks_like_repeater {
        add(
            &mut score,
            -3.0,
            "HTTP endpoint looks like TP-Link repeater/router UI".to_string(),
        );
    }
    if hostname_brand {
        add(
            &mut score,
            2.0,
            format!(
                "Hostname \"{}\" suggests a Tapo/TP-Link device",
                hostname.unwrap_or_default()
            ),
        );
    }
    if tplink_oui {
        add(&mut score, 1.0, "MAC OUI is assigned to TP-Link".to_string());
    }

    let tplink_signal = tplink_oui || hostname_brand || fingerprint_brand;
    let camera_service = rtsp_open
        || onvif_port_open
        || control_open
        || probe.seen_via_onvif
        || probe.seen_via_tapo_broadcast
        || probe.seen_via_tapo_unicast;

    let mut is_likely = fingerprint.contains("tapo")
        || hostname_brand
        || (camera_service && tplink_signal)
        || (rtsp_open && onvif_port_open)
        || (probe.seen_via_onvif && rtsp_open)
        || (probe.seen_via_tapo_broadcast && (rtsp_open || onvif_port_open || web_open))
        || (probe.seen_via_tapo_unicast
            && (rtsp_open || onvif_port_open || web_open || tplink_signal))
        || (control_open && tplink_signal && !looks_like_repeater)
        || (rtsp_open && web_open && score >= 2.5);

    // Repeater override: brand markers without any camera-grade service
    // never make a detection.
    if looks_like_repeater
        && !rtsp_open
        && !onvif_port_open
        && !probe.seen_via_onvif
        && !probe.seen_via_tapo_unicast
    {
        is_likely = false;
    }

    let reason = if clauses.is_empty() {
        "No Tapo-specific markers were found.".to_string()
    } else {
        clauses.join("; ")
    };

    CandidateEvaluation {
        is_likely,
        score: (score * 100.0).round() / 100.0,
        reason,
    }
}
