//! TP-Link OUI lookup
//!
//! MAC prefixes registered to TP-Link Technologies, used as a weak brand
//! signal by the classifier. The table covers the allocations observed on
//! Tapo cameras and TP-Link home equipment; it is deliberately small and
//! static rather than a full IEEE registry.

/// Known TP-Link OUIs as uppercase 6-hex-digit prefixes
pub const TPLINK_OUIS: [&str; 27] = [
    "0846EA", "14CC20", "1C61B4", "246F28", "2C3AF2", "30B5C2", "488F5A", "50C7BF", "60E327",
    "74DA38", "84D81B", "8C3BA5", "98DA60", "A0F3C1", "AC84C6", "B0487A", "B09575", "C04A00",
    "C05627", "C46E1F", "D067E5", "D85D4C", "DC9FDB", "E894F6", "EC086B", "F4F26D", "FCECDA",
];

/// Whether a MAC address carries a TP-Link OUI
///
/// Accepts colon- or hyphen-delimited MACs in any case; anything too short
/// to hold an OUI is simply not TP-Link.
pub fn is_tplink_oui(mac: &str) -> bool {
    let prefix: String = mac
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    prefix.len() == 6 && TPLINK_OUIS.contains(&prefix.as_str())
}
