//! Result rendering

use colored::Colorize;
use localcam_core::{Detection, ScanDiagnostics};

/// Render detections as human-readable text
pub fn render_detections(detections: &[Detection]) -> String {
    if detections.is_empty() {
        return format!("{}\n", "No likely Tapo cameras found.".yellow());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format!("{} likely camera(s) found:", detections.len())
            .green()
            .bold()
    ));

    for detection in detections {
        out.push_str(&format!(
            "  {}  {}\n",
            detection.ip.to_string().bold(),
            format!("confidence {:.2}", detection.confidence).cyan()
        ));
        if let Some(hostname) = &detection.hostname {
            out.push_str(&format!("      hostname: {}\n", hostname));
        }
        if let Some(mac) = &detection.mac {
            out.push_str(&format!("      mac:      {}\n", mac));
        }
        if !detection.open_ports.is_empty() {
            let ports: Vec<String> = detection.open_ports.iter().map(u16::to_string).collect();
            out.push_str(&format!("      ports:    {}\n", ports.join(", ")));
        }
        out.push_str(&format!("      reason:   {}\n", detection.reason.dimmed()));
    }
    out
}

/// Render the sweep diagnostics as human-readable text
pub fn render_diagnostics(diagnostics: &ScanDiagnostics) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Sweep diagnostics:".bold()));
    for subnet in &diagnostics.subnets_scanned {
        out.push_str(&format!("  subnet: {}\n", subnet));
    }
    out.push_str(&format!(
        "  targets: {}  arp seeds: {}  onvif hints: {}  broadcast hints: {}  unicast hits: {}\n",
        diagnostics.enumerated_host_count,
        diagnostics.arp_seed_count,
        diagnostics.onvif_hint_count,
        diagnostics.tapo_broadcast_hint_count,
        diagnostics.tapo_unicast_hint_count,
    ));
    out.push_str(&format!(
        "  responsive hosts: {}\n",
        diagnostics.responsive_host_count
    ));

    for candidate in &diagnostics.candidates {
        let verdict = if candidate.is_likely {
            "LIKELY".green()
        } else {
            "UNLIKELY".red()
        };
        out.push_str(&format!(
            "  {:<10} {}  {:.2}  {}\n",
            verdict,
            candidate.ip,
            candidate.confidence,
            candidate.reason.dimmed()
        ));
    }
    out
}
