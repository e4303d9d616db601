//! # Warden Ledger
//!
//! Durable per-user state for Warden.
//!
//! This crate provides two stores, each with two backends:
//!
//! - **Deposit ledger**: monotonic per-user balance watermark
//! - **Notification gate**: append-only set of users already announced
//!
//! - **Memory**: Lock-free maps for development and testing
//! - **File**: Snapshot files written atomically (temp file + fsync + rename)
//!   before any change is acknowledged
//!
//! Plus an [`AddressJournal`] recording every address served (public data only).
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_ledger::{FileLedger, DepositLedger};
//!
//! let ledger = FileLedger::open("data/ledger.bin").await?;
//! let r = ledger.reconcile(UserId::new(42), 1_500_000_000).await?;
//! assert_eq!(r.delta, 1_500_000_000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod snapshot;
mod memory;
mod file;
mod journal;

pub use memory::{MemoryGate, MemoryLedger};
pub use file::{FileGate, FileLedger, LedgerEntry};
pub use journal::{AddressJournal, JournalRecord};

// Re-export the traits from core
pub use warden_core::traits::{DepositLedger, NotificationGate};
