//! Secret types: the process master secret and per-user secret material.
//!
//! Both are zeroized on drop and never print their contents.

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{PUBLIC_KEY_SIZE, SECRET_MATERIAL_SIZE, SEED_SIZE};
use crate::error::{Result, WardenError};

// ═══════════════════════════════════════════════════════════════════════════════
// MASTER SECRET
// ═══════════════════════════════════════════════════════════════════════════════

/// Process-wide derivation secret.
///
/// Loaded once at startup and immutable afterwards. Construction fails with
/// [`WardenError::ConfigError`] when the secret is empty, so a process can
/// never start serving derivations without one.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret {
    bytes: Vec<u8>,
}

impl MasterSecret {
    /// Creates a master secret from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(WardenError::ConfigError("master secret is empty".into()));
        }
        Ok(Self { bytes })
    }

    /// Creates a master secret from a phrase, trimming surrounding whitespace.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        Self::new(phrase.trim().as_bytes().to_vec())
    }

    /// Reads an optional value (typically an environment variable).
    ///
    /// Absence is a configuration error naming the missing setting.
    pub fn from_optional(value: Option<String>, setting: &str) -> Result<Self> {
        match value {
            Some(mut phrase) => {
                let secret = Self::from_phrase(&phrase);
                phrase.zeroize();
                secret.map_err(|_| WardenError::ConfigError(format!("{} is empty", setting)))
            }
            None => Err(WardenError::ConfigError(format!("{} is not set", setting))),
        }
    }

    /// Returns the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterSecret([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECRET MATERIAL
// ═══════════════════════════════════════════════════════════════════════════════

/// 64-byte wallet secret: 32-byte seed followed by its 32-byte public key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretMaterial {
    bytes: [u8; SECRET_MATERIAL_SIZE],
}

impl SecretMaterial {
    /// Assembles secret material from a seed and its public key.
    pub fn from_parts(seed: &[u8; SEED_SIZE], public_key: &[u8; PUBLIC_KEY_SIZE]) -> Self {
        let mut bytes = [0u8; SECRET_MATERIAL_SIZE];
        bytes[..SEED_SIZE].copy_from_slice(seed);
        bytes[SEED_SIZE..].copy_from_slice(public_key);
        Self { bytes }
    }

    /// Creates secret material from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_MATERIAL_SIZE {
            return Err(WardenError::InvalidKeySize {
                expected: SECRET_MATERIAL_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; SECRET_MATERIAL_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Returns all 64 bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_MATERIAL_SIZE] {
        &self.bytes
    }

    /// Returns the 32-byte seed half.
    pub fn seed(&self) -> &[u8] {
        &self.bytes[..SEED_SIZE]
    }

    /// Returns the 32-byte public key half.
    pub fn public_key(&self) -> &[u8] {
        &self.bytes[SEED_SIZE..]
    }

    /// Base58 encoding of all 64 bytes (the common wallet import format).
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// JSON integer array, the Solana CLI keypair file format.
    pub fn to_json_array(&self) -> String {
        let parts: Vec<String> = self.bytes.iter().map(|b| b.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }

    /// Hex encoding of the seed half.
    pub fn seed_hex(&self) -> String {
        hex::encode(self.seed())
    }

    /// Base58 encoding of the seed half.
    pub fn seed_base58(&self) -> String {
        bs58::encode(self.seed()).into_string()
    }

    /// Export in every supported format.
    pub fn export(&self) -> SecretExport {
        SecretExport {
            base58: self.to_base58(),
            json_array: self.to_json_array(),
            seed_hex: self.seed_hex(),
            seed_base58: self.seed_base58(),
        }
    }
}

impl std::fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretMaterial([REDACTED])")
    }
}

/// Copy-friendly renderings of [`SecretMaterial`].
///
/// Only produced when the disclosure policy permits it.
#[derive(Clone, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretExport {
    /// 64-byte secret, base58
    pub base58: String,
    /// 64-byte secret, JSON integer array
    pub json_array: String,
    /// 32-byte seed, hex
    pub seed_hex: String,
    /// 32-byte seed, base58
    pub seed_base58: String,
}

impl std::fmt::Debug for SecretExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretExport([REDACTED])")
    }
}
