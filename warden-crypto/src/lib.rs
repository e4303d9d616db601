//! # Warden Cryptography
//!
//! Deterministic wallet derivation for Warden.
//!
//! This crate provides:
//!
//! - **Hash**: HMAC-SHA256 and SHA-256 over length-unambiguous inputs
//! - **Derivation**: master secret + user id → seed → Ed25519 keypair → address
//!
//! ## Security Properties
//!
//! - Derivation is a pure function; nothing is stored
//! - Seeds and secret material are zeroized on drop
//! - The keyed scheme uses the master secret as the HMAC key, never as a
//!   concatenated prefix
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_core::{MasterSecret, UserId};
//! use warden_crypto::{DerivationScheme, WalletDeriver};
//!
//! let deriver = WalletDeriver::new(MasterSecret::from_phrase("...")?, DerivationScheme::Keyed);
//! let wallet = deriver.derive(UserId::new(42));
//! println!("Fund: {}", wallet.address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod hash;
pub mod derive;

// Re-export main functions at crate root
pub use hash::{hmac_sha256, sha256};
pub use derive::{derive_seed, derive_wallet, expand_seed, verify_address, DerivationScheme, WalletDeriver};
