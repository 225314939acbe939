// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! NWK/APS security sub-header and the CCM* envelope applied to it.
//! Grounded in `network/src/zb.hpp`'s `SecurityControl`/`KeyIdentifier`.

use ccm_star::{AesKey, Nonce};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIdentifier {
    Data = 0,
    Network = 1,
    KeyTransport = 2,
    KeyLoad = 3,
}

impl KeyIdentifier {
    pub fn from_bits(bits: u8) -> KeyIdentifier {
        match (bits >> 3) & 0x3 {
            1 => KeyIdentifier::Network,
            2 => KeyIdentifier::KeyTransport,
            3 => KeyIdentifier::KeyLoad,
            _ => KeyIdentifier::Data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    None = 0,
    Mic32 = 1,
    Mic64 = 2,
    Mic128 = 3,
    Enc = 4,
    EncMic32 = 5,
    EncMic64 = 6,
    EncMic128 = 7,
}

impl SecurityLevel {
    pub fn from_bits(bits: u8) -> SecurityLevel {
        match bits & 0x7 {
            0 => SecurityLevel::None,
            1 => SecurityLevel::Mic32,
            2 => SecurityLevel::Mic64,
            3 => SecurityLevel::Mic128,
            4 => SecurityLevel::Enc,
            5 => SecurityLevel::EncMic32,
            6 => SecurityLevel::EncMic64,
            _ => SecurityLevel::EncMic128,
        }
    }

    /// MIC length in bytes; 0 for `None`/`Enc` (integrity-only levels
    /// still authenticate the header but append no tag here, matching
    /// the codec's `mic_len` parameter rather than a fixed width).
    pub fn mic_len(self) -> usize {
        match self {
            SecurityLevel::None => 0,
            SecurityLevel::Mic32 | SecurityLevel::EncMic32 => 4,
            SecurityLevel::Mic64 | SecurityLevel::EncMic64 => 8,
            SecurityLevel::Mic128 | SecurityLevel::EncMic128 => 16,
            SecurityLevel::Enc => 0,
        }
    }

    pub fn encrypts_payload(self) -> bool {
        matches!(
            self,
            SecurityLevel::Enc
                | SecurityLevel::EncMic32
                | SecurityLevel::EncMic64
                | SecurityLevel::EncMic128
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityControl {
    pub level: SecurityLevel,
    pub key_identifier: KeyIdentifier,
    pub extended_nonce: bool,
}

impl SecurityControl {
    pub fn to_byte(self) -> u8 {
        (self.level as u8) | ((self.key_identifier as u8) << 3) | ((self.extended_nonce as u8) << 5)
    }

    pub fn from_byte(b: u8) -> SecurityControl {
        SecurityControl {
            level: SecurityLevel::from_bits(b),
            key_identifier: KeyIdentifier::from_bits(b),
            extended_nonce: b & (1 << 5) != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub control: SecurityControl,
    pub frame_counter: u32,
    pub source_address: Option<u64>,
}

impl Header {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + 8);
        out.push(self.control.to_byte());
        out.extend_from_slice(&self.frame_counter.to_le_bytes());
        if self.control.extended_nonce {
            if let Some(addr) = self.source_address {
                out.extend_from_slice(&addr.to_le_bytes());
            }
        }
        out
    }

    pub fn decode(wire: &[u8]) -> Option<(Header, usize)> {
        if wire.len() < 5 {
            return None;
        }
        let control = SecurityControl::from_byte(wire[0]);
        let frame_counter = u32::from_le_bytes(wire[1..5].try_into().ok()?);
        if control.extended_nonce {
            if wire.len() < 13 {
                return None;
            }
            let mut b = [0u8; 8];
            b.copy_from_slice(&wire[5..13]);
            Some((
                Header { control, frame_counter, source_address: Some(u64::from_le_bytes(b)) },
                13,
            ))
        } else {
            Some((Header { control, frame_counter, source_address: None }, 5))
        }
    }
}

/// Applies the security level's confidentiality/integrity combination:
/// the header is always authenticated, the payload is encrypted only
/// when the level calls for it.
pub fn secure(header: &Header, payload: &[u8], key: &AesKey) -> Vec<u8> {
    let aad = header.encode();
    let nonce = Nonce::wire(header.source_address.unwrap_or(0), header.frame_counter, header.control.to_byte());
    let mic_len = header.control.level.mic_len();
    let mut out = vec![0u8; payload.len() + mic_len];
    if header.control.level.encrypts_payload() {
        ccm_star::encrypt(&mut out, &nonce, &aad, payload, mic_len, key);
    } else {
        // Integrity-only: the plaintext passes through, only the MIC is
        // computed over header plus payload.
        ccm_star::encrypt(&mut out, &nonce, &[&aad[..], payload].concat(), &[], mic_len, key);
        out = [payload, &out[..mic_len]].concat();
    }
    let mut frame = aad;
    frame.extend_from_slice(&out);
    frame
}

/// Authenticates and, if required, decrypts a secured NWK/APS frame.
/// Returns `None` on a short frame or MIC mismatch -- both drop per the
/// documented failure taxonomy.
pub fn open(wire: &[u8], key: &AesKey) -> Option<Vec<u8>> {
    let (header, header_len) = Header::decode(wire)?;
    let aad = &wire[..header_len];
    let body = &wire[header_len..];
    let mic_len = header.control.level.mic_len();
    if body.len() < mic_len {
        return None;
    }
    let nonce = Nonce::wire(header.source_address.unwrap_or(0), header.frame_counter, header.control.to_byte());
    if header.control.level.encrypts_payload() {
        let payload_len = body.len() - mic_len;
        let mut plain = vec![0u8; payload_len];
        if !ccm_star::decrypt(&mut plain, &nonce, aad, body, payload_len, mic_len, key) {
            return None;
        }
        Some(plain)
    } else {
        let payload_len = body.len() - mic_len;
        let payload = &body[..payload_len];
        let mut tag_check = vec![0u8; mic_len];
        let aad_and_payload = [aad, payload].concat();
        if !ccm_star::decrypt(&mut tag_check, &nonce, &aad_and_payload, &body[payload_len..], 0, mic_len, key) {
            return None;
        }
        Some(payload.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> AesKey {
        AesKey::new(&[0x11; 16])
    }

    #[test]
    fn control_byte_round_trips() {
        let control = SecurityControl {
            level: SecurityLevel::EncMic32,
            key_identifier: KeyIdentifier::Network,
            extended_nonce: true,
        };
        let decoded = SecurityControl::from_byte(control.to_byte());
        assert_eq!(decoded, control);
    }

    #[test]
    fn encrypted_level_round_trips_through_secure_and_open() {
        let header = Header {
            control: SecurityControl {
                level: SecurityLevel::EncMic32,
                key_identifier: KeyIdentifier::Network,
                extended_nonce: false,
            },
            frame_counter: 7,
            source_address: None,
        };
        let key = test_key();
        let wire = secure(&header, b"toggle", &key);
        let plain = open(&wire, &key).unwrap();
        assert_eq!(plain, b"toggle");
    }

    #[test]
    fn wrong_key_is_rejected() {
        let header = Header {
            control: SecurityControl {
                level: SecurityLevel::EncMic32,
                key_identifier: KeyIdentifier::Network,
                extended_nonce: false,
            },
            frame_counter: 1,
            source_address: None,
        };
        let wire = secure(&header, b"x", &test_key());
        assert!(open(&wire, &AesKey::new(&[0x22; 16])).is_none());
    }

    #[test]
    fn extended_nonce_header_round_trips() {
        let header = Header {
            control: SecurityControl {
                level: SecurityLevel::EncMic32,
                key_identifier: KeyIdentifier::Network,
                extended_nonce: true,
            },
            frame_counter: 3,
            source_address: Some(0x0011223344556677),
        };
        let encoded = header.encode();
        let (decoded, len) = Header::decode(&encoded).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(len, encoded.len());
    }
}
