//! AES-128 key schedule.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use zeroize::Zeroize;

/// Length in bytes of an AES-128 key.
pub const KEY_LEN: usize = 16;

/// The AES-128 key schedule (Ψ in the data model): the round keys derived
/// once from a 128-bit key and reused for every block encryption after that.
/// The expansion itself is delegated to the RustCrypto `aes` crate rather
/// than hand-rolled, but the "derive once, immutable after that" contract
/// the source firmware models is preserved here -- `AesKey` has no API for
/// mutating the schedule in place.
pub struct AesKey {
    raw: [u8; KEY_LEN],
    cipher: Aes128,
}

impl Clone for AesKey {
    fn clone(&self) -> Self {
        AesKey::new(&self.raw)
    }
}

impl AesKey {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        AesKey { raw: *key, cipher: Aes128::new(GenericArray::from_slice(key)) }
    }

    pub fn raw(&self) -> &[u8; KEY_LEN] {
        &self.raw
    }

    /// AES-128 single block encryption, `E(key, block)` in the spec's
    /// notation.
    pub fn encrypt_block(&self, block: &mut [u8; 16]) {
        self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
}

impl Drop for AesKey {
    fn drop(&mut self) {
        self.raw.zeroize();
    }
}

impl core::fmt::Debug for AesKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AesKey").field("raw", &"<redacted>").finish()
    }
}
