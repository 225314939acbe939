//! AES-128 CCM* authenticated encryption and the ZigBee MMO hash family,
//! shared by the wired-bus and radio link layers.

mod ccm;
mod hash;
mod key;
mod nonce;

pub use ccm::{decrypt, encrypt};
pub use hash::{hash, key_hash};
pub use key::{AesKey, KEY_LEN};
pub use nonce::{Nonce, NONCE_LEN};

/// Maximum authentication tag length CCM* supports in this workspace.
pub const MAX_MIC_LEN: usize = 16;

/// The MIC lengths the spec calls out as valid, in ascending order.
pub const VALID_MIC_LENS: [usize; 5] = [0, 2, 4, 8, 16];
