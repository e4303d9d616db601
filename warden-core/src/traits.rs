//! Common traits for Warden.
//!
//! These traits define the seams between the session facade and its
//! collaborators, so stores and adapters can be swapped for tests or other
//! backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AssetPair, OperatorEvent, Reconciliation, UserId, WalletAddress};

// ═══════════════════════════════════════════════════════════════════════════════
// BALANCE ORACLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of truth for on-chain balances.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Returns the confirmed balance of `address` in lamports.
    ///
    /// Fails with `Timeout` or `Unavailable`; never substitutes zero.
    async fn get_live_balance(&self, address: &WalletAddress) -> Result<u64>;
}

/// Conversion-rate feed.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Returns the price of one unit of `pair.base` in `pair.quote`.
    async fn get_conversion_rate(&self, pair: &AssetPair) -> Result<f64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATOR NOTIFIER
// ═══════════════════════════════════════════════════════════════════════════════

/// Delivers events to the operator channel.
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    /// Delivers one event.
    ///
    /// Returns `DeliveryFailed` only when the channel definitively refused
    /// the event. Any other `Err` (timeouts, transport errors, retries
    /// exhausted) leaves delivery unknown and callers must assume the
    /// event may have arrived.
    async fn notify(&self, event: &OperatorEvent) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPOSIT LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Durable per-user deposit watermark.
///
/// Implementations must make `reconcile` an atomic compare-and-update per
/// user and persist before returning.
#[async_trait]
pub trait DepositLedger: Send + Sync {
    /// Raises the watermark to `observed` if it is higher.
    ///
    /// Fails with `PersistenceError` when the durable write fails, in which
    /// case the stored value is unchanged.
    async fn reconcile(&self, user: UserId, observed: u64) -> Result<Reconciliation>;

    /// Current watermark, or `None` if the user was never observed.
    async fn cumulative(&self, user: UserId) -> Result<Option<u64>>;

    /// Number of users with an entry.
    async fn count(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// NOTIFICATION GATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Durable "first caller wins" flag per user.
#[async_trait]
pub trait NotificationGate: Send + Sync {
    /// Returns `true` exactly once per user for the lifetime of the store.
    ///
    /// Insert-if-absent, persisted before returning `true`. On a failed
    /// write the user is not marked, so a later call can still win.
    async fn try_consume(&self, user: UserId) -> Result<bool>;

    /// Compensation for a consume whose notification definitively failed.
    ///
    /// Only the session saga calls this, right after its own winning
    /// `try_consume`.
    async fn rollback(&self, user: UserId) -> Result<()>;

    /// True if the user already consumed the gate.
    async fn is_consumed(&self, user: UserId) -> Result<bool>;

    /// Number of consumed users.
    async fn count(&self) -> Result<u64>;
}
