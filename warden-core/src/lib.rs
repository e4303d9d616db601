//! # Warden Core
//!
//! Core types, errors, and traits for Warden, the per-user wallet derivation
//! and deposit tracking subsystem.
//!
//! This crate provides the foundational building blocks used by all other Warden crates:
//!
//! - **Types**: User ids, master secret, derived wallets, ledger results, view models
//! - **Errors**: The configuration / collaborator / persistence error taxonomy
//! - **Constants**: Key sizes, domain separators, defaults
//! - **Traits**: Balance source, price feed, operator notifier, ledger and gate stores
//!
//! ## Example
//!
//! ```rust
//! use warden_core::{UserId, WalletView, BalanceStatus};
//!
//! let user: UserId = "42".parse().unwrap();
//! assert_eq!(user.get(), 42);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, WardenError};
pub use traits::*;
pub use types::*;
