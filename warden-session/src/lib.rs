//! # Warden Session
//!
//! The wallet session facade: the single entry point the front end calls.
//!
//! [`WalletSession::show_wallet`] derives the user's wallet, reads the live
//! balance, reconciles the deposit ledger and consumes the one-time
//! notification gate under a per-user lock, notifies the operator, prices
//! the balance and returns a [`WalletView`].
//!
//! Oracle calls and operator notifications run outside the lock; only the
//! store operations are serialized per user.
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_session::{WalletSession, WardenConfig};
//!
//! let session = WalletSession::from_config(WardenConfig::from_env()?).await?;
//! let view = session.show_wallet(UserId::new(42)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod lock;
mod session;

pub use config::{TelegramSettings, WardenConfig};
pub use lock::KeyedMutex;
pub use session::{SessionStats, WalletSession};

pub use warden_core::types::{BalanceStatus, DisclosurePolicy, UserId, WalletAddress, WalletView};
