//! Discovery wire payloads
//!
//! The protocol constants the beacons and unicast probes put on the wire:
//! the Tapo JSON discovery bodies, the TP-Link legacy XOR stream cipher
//! used on port 9999, and the ONVIF WS-Discovery SOAP envelope.

use std::net::Ipv4Addr;
use uuid::Uuid;

/// Tapo discovery/control UDP port (plain JSON)
pub const TAPO_DISCOVERY_PORT: u16 = 20002;
/// TP-Link legacy discovery UDP port (XOR-obfuscated JSON)
pub const TPLINK_LEGACY_PORT: u16 = 9999;
/// WS-Discovery multicast group
pub const ONVIF_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
/// WS-Discovery UDP port
pub const ONVIF_DISCOVERY_PORT: u16 = 3702;

/// Discovery request bodies understood by different Tapo/TP-Link firmware
/// generations
pub const TAPO_DISCOVERY_PAYLOADS: [&str; 3] = [
    r#"{"system":{"get_sysinfo":{}}}"#,
    r#"{"method":"getDeviceInfo","params":null}"#,
    r#"{"method":"multipleRequest","params":{"requests":[{"method":"getDeviceInfo","params":null}]}}"#,
];

/// TP-Link legacy stream cipher (encrypt direction)
///
/// XOR chaining with initial key 0xAB: each ciphertext byte becomes the
/// key for the next.
pub fn tplink_obfuscate(data: &[u8]) -> Vec<u8> {
    let mut key = 0xABu8;
    data.iter()
        .map(|&b| {
            let c = b ^ key;
            key = c;
            c
        })
        .collect()
}

/// TP-Link legacy stream cipher (decrypt direction)
///
/// The previous *ciphertext* byte is the next key.
pub fn tplink_deobfuscate(data: &[u8]) -> Vec<u8> {
    let mut key = 0xABu8;
    data.iter()
        .map(|&c| {
            let b = c ^ key;
            key = c;
            b
        })
        .collect()
}

/// Build a WS-Discovery `Probe` envelope for network video transmitters
///
/// A fresh random `MessageID` is generated per call so replies can never
/// be confused across overlapping probes.
pub fn onvif_probe_envelope() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" "#,
            r#"xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing" "#,
            r#"xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery" "#,
            r#"xmlns:dn="http://www.onvif.org/ver10/network/wsdl">"#,
            r#"<s:Header>"#,
            r#"<a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe</a:Action>"#,
            r#"<a:MessageID>uuid:{}</a:MessageID>"#,
            r#"<a:To s:mustUnderstand="1">urn:schemas-xmlsoap-org:ws:2005:04:discovery</a:To>"#,
            r#"</s:Header>"#,
            r#"<s:Body><d:Probe><d:Types>dn:NetworkVideoTransmitter</d:Types></d:Probe></s:Body>"#,
            r#"</s:Envelope>"#
        ),
        Uuid::new_v4()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obfuscation_known_vector() {
        // First byte XORs against 0xAB, then chains on ciphertext.
        let cipher = tplink_obfuscate(b"{\"a\"");
        assert_eq!(cipher[0], b'{' ^ 0xAB);
        assert_eq!(cipher[1], b'"' ^ cipher[0]);
        assert_eq!(cipher[2], b'a' ^ cipher[1]);
        assert_eq!(cipher[3], b'"' ^ cipher[2]);
    }

    #[test]
    fn test_obfuscation_roundtrip() {
        for payload in TAPO_DISCOVERY_PAYLOADS {
            let cipher = tplink_obfuscate(payload.as_bytes());
            assert_ne!(cipher, payload.as_bytes());
            assert_eq!(tplink_deobfuscate(&cipher), payload.as_bytes());
        }
    }

    #[test]
    fn test_obfuscation_empty_input() {
        assert!(tplink_obfuscate(&[]).is_empty());
        assert!(tplink_deobfuscate(&[]).is_empty());
    }

    #[test]
    fn test_payloads_are_exact() {
        assert_eq!(TAPO_DISCOVERY_PAYLOADS[0], r#"{"system":{"get_sysinfo":{}}}"#);
        assert_eq!(
            TAPO_DISCOVERY_PAYLOADS[1],
            r#"{"method":"getDeviceInfo","params":null}"#
        );
        assert!(TAPO_DISCOVERY_PAYLOADS[2].contains(r#""method":"multipleRequest""#));
    }

    #[test]
    fn test_onvif_envelope_shape() {
        let envelope = onvif_probe_envelope();
        assert!(envelope.contains("http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe"));
        assert!(envelope.contains("urn:schemas-xmlsoap-org:ws:2005:04:discovery"));
        assert!(envelope.contains("dn:NetworkVideoTransmitter"));
        assert!(envelope.contains("<a:MessageID>uuid:"));
    }

    #[test]
    fn test_onvif_envelope_unique_message_ids() {
        assert_ne!(onvif_probe_envelope(), onvif_probe_envelope());
    }
}
