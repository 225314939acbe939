// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On-wire frame encode/decode: arbiter-encoded header (authenticated, not
//! encrypted) plus a CCM*-protected body, per spec.md §4.3.

use ccm_star::{AesKey, Nonce};

use crate::arbiter::{decode_short_address, encode_short_address};

pub const MIC_LEN: usize = 4;

/// Encodes a data frame's on-wire bytes: two arbiter bytes carrying the
/// address, the 4-byte little-endian security counter, then the encrypted
/// body (`endpoint_index ‖ value`) with its MIC appended.
pub fn encode_data_frame(short_address: u8, counter: u32, body_plain: &[u8], key: &AesKey) -> Vec<u8> {
    let (lo, hi) = encode_short_address(short_address);
    let mut header = Vec::with_capacity(6);
    header.push(lo);
    header.push(hi);
    header.extend_from_slice(&counter.to_le_bytes());

    let nonce = Nonce::wire(short_address as u64, counter, 0);
    let mut out = vec![0u8; body_plain.len() + MIC_LEN];
    ccm_star::encrypt(&mut out, &nonce, &header, body_plain, MIC_LEN, key);

    let mut frame = header;
    frame.extend_from_slice(&out);
    frame
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub short_address: u8,
    pub counter: u32,
    pub body: Vec<u8>,
}

/// Decodes and authenticates a data frame. Returns `None` on header
/// under-length or MIC mismatch -- both are "silently drop" per spec.md's
/// failure taxonomy.
pub fn decode_data_frame(wire: &[u8], key: &AesKey) -> Option<DecodedFrame> {
    if wire.len() < 6 + MIC_LEN {
        return None;
    }
    let short_address = decode_short_address(wire[0], wire[1]);
    let counter = u32::from_le_bytes(wire[2..6].try_into().ok()?);
    let header = &wire[0..6];
    let cipher_with_mic = &wire[6..];
    let payload_len = cipher_with_mic.len() - MIC_LEN;

    let nonce = Nonce::wire(short_address as u64, counter, 0);
    let mut body = vec![0u8; payload_len];
    if !ccm_star::decrypt(&mut body, &nonce, header, cipher_with_mic, payload_len, MIC_LEN, key) {
        return None;
    }
    Some(DecodedFrame { short_address, counter, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> AesKey {
        AesKey::new(&[0x42; 16])
    }

    #[test]
    fn round_trips_a_data_frame() {
        let key = test_key();
        let wire = encode_data_frame(5, 10, &[3, 7], &key);
        let decoded = decode_data_frame(&wire, &key).unwrap();
        assert_eq!(decoded.short_address, 5);
        assert_eq!(decoded.counter, 10);
        assert_eq!(decoded.body, vec![3, 7]);
    }

    #[test]
    fn tampered_body_is_rejected() {
        let key = test_key();
        let mut wire = encode_data_frame(2, 1, &[9], &key);
        let last = wire.len() - 1;
        wire[last] ^= 1;
        assert!(decode_data_frame(&wire, &key).is_none());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let wire = encode_data_frame(2, 1, &[9], &test_key());
        let other_key = AesKey::new(&[0x99; 16]);
        assert!(decode_data_frame(&wire, &other_key).is_none());
    }

    #[test]
    fn short_frame_is_rejected() {
        let key = test_key();
        assert!(decode_data_frame(&[0, 0], &key).is_none());
    }
}
