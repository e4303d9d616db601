//! Per-user wallet derivation.
//!
//! ## Derivation Flow
//!
//! ```text
//! keyed:   seed = HMAC-SHA256(master_secret, DOMAIN_WALLET_SEED || 0x00 || decimal(user_id))
//! legacy:  seed = SHA-256(master_secret || ":" || decimal(user_id))
//!                 ↓
//! signing_key = Ed25519(seed)          (RFC 8032 seed expansion)
//!                 ↓
//! address = base58(public_key)         secret = seed || public_key
//! ```
//!
//! The legacy scheme reproduces wallets already handed out before the keyed
//! scheme existed. Both are total functions of (secret, id).

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use warden_core::constants::{DOMAIN_SEPARATOR_BYTE, DOMAIN_WALLET_SEED, LEGACY_SEPARATOR, SEED_SIZE};
use warden_core::error::WardenError;
use warden_core::types::{DerivedWallet, MasterSecret, SecretMaterial, UserId, WalletAddress};

use crate::hash::{hmac_sha256, sha256};

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEME
// ═══════════════════════════════════════════════════════════════════════════════

/// How the per-user seed is computed from the master secret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationScheme {
    /// HMAC keyed by the master secret, domain-separated message
    #[default]
    Keyed,
    /// SHA-256 of `secret:id`, compatible with previously issued wallets
    Legacy,
}

impl fmt::Display for DerivationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationScheme::Keyed => f.write_str("keyed"),
            DerivationScheme::Legacy => f.write_str("legacy"),
        }
    }
}

impl FromStr for DerivationScheme {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyed" | "hmac" => Ok(DerivationScheme::Keyed),
            "legacy" | "sha256" => Ok(DerivationScheme::Legacy),
            other => Err(WardenError::ConfigError(format!(
                "unknown derivation scheme '{}' (expected 'keyed' or 'legacy')",
                other
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEED
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes the 32-byte seed for `user`.
pub fn derive_seed(
    secret: &MasterSecret,
    user: UserId,
    scheme: DerivationScheme,
) -> Zeroizing<[u8; SEED_SIZE]> {
    let id = user.to_canonical_string();
    let seed = match scheme {
        DerivationScheme::Keyed => hmac_sha256(
            secret.as_bytes(),
            &[DOMAIN_WALLET_SEED, &[DOMAIN_SEPARATOR_BYTE], id.as_bytes()],
        ),
        DerivationScheme::Legacy => sha256(&[secret.as_bytes(), LEGACY_SEPARATOR, id.as_bytes()]),
    };
    Zeroizing::new(seed)
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEYPAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// Expands a seed into a wallet using standard Ed25519 seed expansion.
pub fn expand_seed(seed: &[u8; SEED_SIZE]) -> DerivedWallet {
    let signing_key = SigningKey::from_bytes(seed);
    let public_key = signing_key.verifying_key().to_bytes();

    DerivedWallet {
        address: WalletAddress::from_array(public_key),
        secret: SecretMaterial::from_parts(seed, &public_key),
    }
}

/// Derives the wallet for `user`. Pure and total.
pub fn derive_wallet(secret: &MasterSecret, user: UserId, scheme: DerivationScheme) -> DerivedWallet {
    let seed = derive_seed(secret, user, scheme);
    expand_seed(&seed)
}

/// Checks that `address` belongs to `user`, comparing in constant time.
pub fn verify_address(
    secret: &MasterSecret,
    user: UserId,
    scheme: DerivationScheme,
    address: &WalletAddress,
) -> bool {
    let derived = derive_wallet(secret, user, scheme);
    derived.address.as_bytes().ct_eq(address.as_bytes()).into()
}

// ═══════════════════════════════════════════════════════════════════════════════
// DERIVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Owns the master secret and derives wallets on demand.
///
/// Constructing one requires a [`MasterSecret`], which cannot be empty, so
/// a missing secret surfaces at startup rather than on the first request.
pub struct WalletDeriver {
    secret: MasterSecret,
    scheme: DerivationScheme,
}

impl WalletDeriver {
    /// Creates a deriver.
    pub fn new(secret: MasterSecret, scheme: DerivationScheme) -> Self {
        Self { secret, scheme }
    }

    /// The scheme in use.
    pub fn scheme(&self) -> DerivationScheme {
        self.scheme
    }

    /// Derives the full wallet (address + secret material).
    pub fn derive(&self, user: UserId) -> DerivedWallet {
        derive_wallet(&self.secret, user, self.scheme)
    }

    /// Derives only the public address.
    pub fn address(&self, user: UserId) -> WalletAddress {
        self.derive(user).address
    }

    /// Checks that `address` belongs to `user`.
    pub fn verify(&self, user: UserId, address: &WalletAddress) -> bool {
        verify_address(&self.secret, user, self.scheme, address)
    }
}

impl fmt::Debug for WalletDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletDeriver")
            .field("secret", &self.secret)
            .field("scheme", &self.scheme)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn secret() -> MasterSecret {
        MasterSecret::from_phrase(TEST_MNEMONIC).unwrap()
    }

    #[test]
    fn test_rfc8032_seed_expansion() {
        let seed: [u8; 32] = hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
            .unwrap()
            .try_into()
            .unwrap();
        let wallet = expand_seed(&seed);

        assert_eq!(
            hex::encode(wallet.address.as_bytes()),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
        assert_eq!(wallet.address.to_base58(), "FVen3X669xLzsi6N2V91DoiyzHzg1uAgqiT8jZ9nS96Z");
        assert_eq!(wallet.secret.seed(), &seed);
        assert_eq!(wallet.secret.public_key(), wallet.address.as_bytes());
    }

    #[test]
    fn test_legacy_scheme_matches_issued_wallets() {
        let wallet = derive_wallet(&secret(), UserId::new(42), DerivationScheme::Legacy);
        assert_eq!(
            wallet.secret.seed_hex(),
            "c4a4128f245f3c18074677aca9748b2d7839214ac4eb6ff1fe0b1ad27ef17b28"
        );
        assert_eq!(wallet.address.to_base58(), "4aBYLgHDEqTnAJFsgu8ovzDXgS7n1HzT3aSawZ5Q3JUU");
    }

    #[test]
    fn test_keyed_scheme_vector() {
        let wallet = derive_wallet(&secret(), UserId::new(42), DerivationScheme::Keyed);
        assert_eq!(
            wallet.secret.seed_hex(),
            "5372b6ede97997a7f7b1e08458527c876fda0a0dfc6d85e642b0c3bd23fc58cc"
        );
        assert_eq!(wallet.address.to_base58(), "4H7znxsWSoGyh2JcJANXVXvMifzUoKRpCeEPSXtfhkgc");
    }

    #[test]
    fn test_legacy_trims_secret_whitespace() {
        let padded = MasterSecret::from_phrase(&format!("  {}\n", TEST_MNEMONIC)).unwrap();
        let a = derive_wallet(&padded, UserId::new(42), DerivationScheme::Legacy);
        let b = derive_wallet(&secret(), UserId::new(42), DerivationScheme::Legacy);
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn test_schemes_differ() {
        let keyed = derive_wallet(&secret(), UserId::new(7), DerivationScheme::Keyed);
        let legacy = derive_wallet(&secret(), UserId::new(7), DerivationScheme::Legacy);
        assert_ne!(keyed.address, legacy.address);
    }

    #[test]
    fn test_secret_matters() {
        let other = MasterSecret::from_phrase("another secret").unwrap();
        let a = derive_wallet(&secret(), UserId::new(7), DerivationScheme::Keyed);
        let b = derive_wallet(&other, UserId::new(7), DerivationScheme::Keyed);
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_secret_material_is_seed_then_public_key() {
        let wallet = derive_wallet(&secret(), UserId::new(1), DerivationScheme::Keyed);
        let bytes = wallet.secret.as_bytes();
        assert_eq!(&bytes[32..], wallet.address.as_bytes());
        assert_eq!(*derive_seed(&secret(), UserId::new(1), DerivationScheme::Keyed), bytes[..32]);
    }

    #[test]
    fn test_verify_address() {
        let deriver = WalletDeriver::new(secret(), DerivationScheme::Keyed);
        let address = deriver.address(UserId::new(99));

        assert!(deriver.verify(UserId::new(99), &address));
        assert!(!deriver.verify(UserId::new(100), &address));
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("keyed".parse::<DerivationScheme>().unwrap(), DerivationScheme::Keyed);
        assert_eq!(" LEGACY ".parse::<DerivationScheme>().unwrap(), DerivationScheme::Legacy);
        assert!("bip44".parse::<DerivationScheme>().unwrap_err().is_fatal());
        assert_eq!(DerivationScheme::default(), DerivationScheme::Keyed);
    }

    #[test]
    fn test_deriver_debug_redacts_secret() {
        let deriver = WalletDeriver::new(secret(), DerivationScheme::Legacy);
        let debug = format!("{:?}", deriver);
        assert!(!debug.contains("abandon"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_no_collisions_over_id_range() {
        let deriver = WalletDeriver::new(secret(), DerivationScheme::Keyed);
        let addresses: HashSet<WalletAddress> =
            (-500i64..1500).map(|id| deriver.address(UserId::new(id))).collect();
        assert_eq!(addresses.len(), 2000);
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(phrase in "[a-z ]{1,64}", id in any::<i64>()) {
            prop_assume!(!phrase.trim().is_empty());
            let secret = MasterSecret::from_phrase(&phrase).unwrap();
            for scheme in [DerivationScheme::Keyed, DerivationScheme::Legacy] {
                let a = derive_wallet(&secret, UserId::new(id), scheme);
                let b = derive_wallet(&secret, UserId::new(id), scheme);
                prop_assert_eq!(a.address, b.address);
                prop_assert_eq!(a.secret.as_bytes(), b.secret.as_bytes());
            }
        }

        #[test]
        fn prop_distinct_ids_distinct_addresses(ids in proptest::collection::hash_set(any::<i64>(), 2..64)) {
            let deriver = WalletDeriver::new(secret(), DerivationScheme::Keyed);
            let addresses: HashSet<WalletAddress> =
                ids.iter().map(|id| deriver.address(UserId::new(*id))).collect();
            prop_assert_eq!(addresses.len(), ids.len());
        }
    }
}
