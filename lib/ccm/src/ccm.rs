//! CCM* authenticated encryption, ported from the firmware's hand-written
//! `crypt.cpp`.
//!
//! `L` (the message-length field width) is fixed at 2, as required by
//! 802.15.4/ZigBee. The authentication phase's flags byte always encodes an
//! `M` of 4 in its `(M-2)/2` nibble, independent of the tag length actually
//! requested by the caller: Green Power "security level 1" frames carry a
//! 2-byte MIC generated and verified against the same 4-byte-class tag
//! material, just truncated on the wire, and the source firmware reuses
//! that one code path for every tag length from 0 to 16 bytes rather than
//! re-deriving the flags nibble per call.

use crate::key::AesKey;
use crate::nonce::{Nonce, NONCE_LEN};

const L: usize = 2;
const BLOCK: usize = 16;

fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// `Xi ^= header_len_be ‖ header`, continuing the CBC-MAC chain over the
/// authenticated header, one 16-byte block at a time.
fn mac_header(xi: &mut [u8; BLOCK], key: &AesKey, header: &[u8]) {
    if header.is_empty() {
        return;
    }
    let mut first = [0u8; BLOCK];
    first[0] = (header.len() >> 8) as u8;
    first[1] = header.len() as u8;
    let first_chunk_len = header.len().min(BLOCK - 2);
    first[2..2 + first_chunk_len].copy_from_slice(&header[..first_chunk_len]);
    xor_into(xi, &first);
    key.encrypt_block(xi);

    let mut rest = &header[first_chunk_len..];
    while !rest.is_empty() {
        let mut block = [0u8; BLOCK];
        let n = rest.len().min(BLOCK);
        block[..n].copy_from_slice(&rest[..n]);
        xor_into(xi, &block);
        key.encrypt_block(xi);
        rest = &rest[n..];
    }
}

/// Continue the CBC-MAC chain over the plaintext payload.
fn mac_payload(xi: &mut [u8; BLOCK], key: &AesKey, payload: &[u8]) {
    let mut rest = payload;
    while !rest.is_empty() {
        let mut block = [0u8; BLOCK];
        let n = rest.len().min(BLOCK);
        block[..n].copy_from_slice(&rest[..n]);
        xor_into(xi, &block);
        key.encrypt_block(xi);
        rest = &rest[n..];
    }
}

/// B.3.2 authentication transformation: returns the full 16-byte tag
/// material (`Xi`), of which the caller keeps only `mic_len` bytes.
fn authenticate(nonce: &Nonce, header: &[u8], payload: &[u8], key: &AesKey) -> [u8; BLOCK] {
    let flags: u8 = 0x40 | (((4u8 - 2) / 2) << 3) | (L as u8 - 1);

    let mut xi = [0u8; BLOCK];
    xi[0] = flags;
    xi[1..1 + NONCE_LEN].copy_from_slice(&nonce.0);
    xi[14] = (payload.len() >> 8) as u8;
    xi[15] = payload.len() as u8;
    key.encrypt_block(&mut xi);

    mac_header(&mut xi, key, header);
    mac_payload(&mut xi, key, payload);
    xi
}

/// CTR-mode crypt/decrypt of the payload plus the tag, shared by encrypt and
/// decrypt (the XOR stream is its own inverse).
fn ctr_crypt(out_payload: &mut [u8], out_tag: &mut [u8], nonce: &Nonce, in_payload: &[u8], in_tag: &[u8], key: &AesKey) {
    let mut a = [0u8; BLOCK];
    a[0] = L as u8 - 1;
    a[1..1 + NONCE_LEN].copy_from_slice(&nonce.0);

    let mut rest_in = in_payload;
    let mut rest_out_idx = 0;
    let mut counter = 1u16;
    while !rest_in.is_empty() {
        a[14] = (counter >> 8) as u8;
        a[15] = counter as u8;
        let mut s = a;
        key.encrypt_block(&mut s);
        let n = rest_in.len().min(BLOCK);
        for j in 0..n {
            out_payload[rest_out_idx + j] = s[j] ^ rest_in[j];
        }
        rest_out_idx += n;
        rest_in = &rest_in[n..];
        counter += 1;
    }

    // A0 / S0 masks the tag.
    a[14] = 0;
    a[15] = 0;
    let mut s0 = a;
    key.encrypt_block(&mut s0);
    for j in 0..out_tag.len() {
        out_tag[j] = s0[j] ^ in_tag[j];
    }
}

/// Encrypts `plain` and appends a `mic_len`-byte authentication tag, writing
/// `plain.len() + mic_len` bytes to `out`.
///
/// `header` is authenticated but not encrypted (it stays in the clear on the
/// wire, ahead of the returned ciphertext).
pub fn encrypt(out: &mut [u8], nonce: &Nonce, header: &[u8], plain: &[u8], mic_len: usize, key: &AesKey) {
    assert!(out.len() >= plain.len() + mic_len);
    assert!(mic_len <= BLOCK);
    let tag = authenticate(nonce, header, plain, key);
    let (out_payload, out_tag) = out.split_at_mut(plain.len());
    ctr_crypt(out_payload, &mut out_tag[..mic_len], nonce, plain, &tag[..mic_len], key);
}

/// Decrypts and verifies `cipher_with_mic` (ciphertext followed by a
/// `mic_len`-byte tag), writing `payload_len` plaintext bytes to `out`.
/// Returns `false` if the tag does not verify; `out` should be discarded in
/// that case, matching the "drop packet" policy at every link layer.
pub fn decrypt(
    out: &mut [u8],
    nonce: &Nonce,
    header: &[u8],
    cipher_with_mic: &[u8],
    payload_len: usize,
    mic_len: usize,
    key: &AesKey,
) -> bool {
    assert!(out.len() >= payload_len);
    assert!(mic_len <= BLOCK);
    assert!(cipher_with_mic.len() >= payload_len + mic_len);

    let (cipher, received_tag) = cipher_with_mic.split_at(payload_len);
    let mut recovered_tag = [0u8; BLOCK];
    ctr_crypt(&mut out[..payload_len], &mut recovered_tag[..mic_len], nonce, cipher, &received_tag[..mic_len], key);

    let expected_tag = authenticate(nonce, header, &out[..payload_len], key);

    // Constant-time compare over the transmitted tag length.
    let mut diff = 0u8;
    for j in 0..mic_len {
        diff |= recovered_tag[j] ^ expected_tag[j];
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::AesKey;

    fn key_from_bytes(bytes: [u8; 16]) -> AesKey {
        AesKey::new(&bytes)
    }

    #[test]
    fn round_trips_for_every_standard_mic_length() {
        let key = key_from_bytes([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
        ]);
        let nonce = Nonce::wire(0x0102030405060708, 7, 0x05);
        let header = [0xAA, 0xBB, 0xCC];
        let plain = b"room controller";

        for mic_len in [0usize, 2, 4, 8, 16] {
            let mut out = vec![0u8; plain.len() + mic_len];
            encrypt(&mut out, &nonce, &header, plain, mic_len, &key);

            let mut recovered = vec![0u8; plain.len()];
            let ok = decrypt(&mut recovered, &nonce, &header, &out, plain.len(), mic_len, &key);
            assert!(ok, "mic_len={mic_len}");
            assert_eq!(recovered, plain);
        }
    }

    #[test]
    fn bit_flip_in_ciphertext_fails_auth() {
        let key = key_from_bytes([0x11; 16]);
        let nonce = Nonce::wire(1, 1, 0);
        let header = [0x01];
        let plain = b"x";
        let mut out = vec![0u8; plain.len() + 4];
        encrypt(&mut out, &nonce, &header, plain, 4, &key);
        out[0] ^= 0x01;
        let mut recovered = vec![0u8; plain.len()];
        assert!(!decrypt(&mut recovered, &nonce, &header, &out, plain.len(), 4, &key));
    }

    #[test]
    fn bit_flip_in_header_fails_auth() {
        let key = key_from_bytes([0x22; 16]);
        let nonce = Nonce::wire(2, 2, 0);
        let header = [0x01, 0x02];
        let plain = b"yy";
        let mut out = vec![0u8; plain.len() + 4];
        encrypt(&mut out, &nonce, &header, plain, 4, &key);
        let mut bad_header = header;
        bad_header[0] ^= 1;
        let mut recovered = vec![0u8; plain.len()];
        assert!(!decrypt(&mut recovered, &nonce, &bad_header, &out, plain.len(), 4, &key));
    }

    #[test]
    fn bit_flip_in_mic_fails_auth() {
        let key = key_from_bytes([0x33; 16]);
        let nonce = Nonce::wire(3, 3, 0);
        let header = [];
        let plain = b"zzz";
        let mut out = vec![0u8; plain.len() + 8];
        encrypt(&mut out, &nonce, &header, plain, 8, &key);
        *out.last_mut().unwrap() ^= 1;
        let mut recovered = vec![0u8; plain.len()];
        assert!(!decrypt(&mut recovered, &nonce, &header, &out, plain.len(), 8, &key));
    }

    /// H.3.4 (SecurityLevel 0b11) from the reference crypto test vectors:
    /// key `{0xC0..0xCF}`, device id `0x87654321`, counter `2`, a single
    /// plaintext byte `0x20`, 4-byte MIC. Pins the exact ciphertext
    /// `83 5F 1A 30 34`, not just a round trip.
    #[test]
    fn green_power_commissioning_vector_round_trips() {
        let key = key_from_bytes([
            0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xCB, 0xCC, 0xCD, 0xCE, 0xCF,
        ]);
        let nonce = Nonce::green_power(0x8765_4321, 2);
        let header = [0x8C, 0x38, 0x21, 0x43, 0x65, 0x87, 0x02, 0x00, 0x00, 0x00];
        let plain = [0x20u8];

        let mut out = [0u8; 1 + 4];
        encrypt(&mut out, &nonce, &header, &plain, 4, &key);
        assert_eq!(out, [0x83, 0x5F, 0x1A, 0x30, 0x34]);

        let mut recovered = [0u8; 1];
        assert!(decrypt(&mut recovered, &nonce, &header, &out, 1, 4, &key));
        assert_eq!(recovered, plain);
    }
}
