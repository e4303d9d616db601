//! Wallet address and derived wallet types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ADDRESS_MAX_LEN, ADDRESS_MIN_LEN, PUBLIC_KEY_SIZE};
use crate::error::{Result, WardenError};
use crate::types::SecretMaterial;

// ═══════════════════════════════════════════════════════════════════════════════
// WALLET ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Public wallet address: an Ed25519 public key, displayed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletAddress {
    bytes: [u8; PUBLIC_KEY_SIZE],
}

impl WalletAddress {
    /// Creates an address from raw public key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(WardenError::InvalidKeySize {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; PUBLIC_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates an address from a fixed-size array.
    pub fn from_array(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the base58 string form.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Parses a base58 address.
    pub fn from_base58(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() < ADDRESS_MIN_LEN || s.len() > ADDRESS_MAX_LEN {
            return Err(WardenError::InvalidAddress(format!(
                "expected {}-{} base58 characters, got {}",
                ADDRESS_MIN_LEN,
                ADDRESS_MAX_LEN,
                s.len()
            )));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| WardenError::InvalidAddress(e.to_string()))?;
        Self::from_bytes(&bytes).map_err(|e| WardenError::InvalidAddress(e.to_string()))
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.to_base58())
    }
}

impl FromStr for WalletAddress {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base58(s)
    }
}

impl Serialize for WalletAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DERIVED WALLET
// ═══════════════════════════════════════════════════════════════════════════════

/// A wallet recomputed from the master secret and a user id.
///
/// Never persisted and never serialized. Values are request-scoped; the
/// secret half is zeroized when the wallet is dropped.
#[derive(Debug)]
pub struct DerivedWallet {
    /// Public address
    pub address: WalletAddress,
    /// Seed || public key
    pub secret: SecretMaterial,
}

impl DerivedWallet {
    /// Assembles a wallet, checking the secret's public half matches the address.
    pub fn new(address: WalletAddress, secret: SecretMaterial) -> Result<Self> {
        if secret.public_key() != address.as_bytes() {
            return Err(WardenError::InternalError(
                "secret material does not match address".into(),
            ));
        }
        Ok(Self { address, secret })
    }
}
