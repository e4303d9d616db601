//! Hashing primitives for seed derivation.
//!
//! ```text
//! keyed:  HMAC-SHA256(key, part_0 || part_1 || ...)
//! legacy: SHA-256(part_0 || part_1 || ...)
//! ```
//!
//! Callers are responsible for making the parts unambiguous (a separator
//! byte that cannot appear in the variable-length part).

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Computes HMAC-SHA256 of the concatenated parts under `key`.
pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// Computes SHA-256 of the concatenated parts.
pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
