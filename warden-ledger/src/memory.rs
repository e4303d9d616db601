//! In-memory ledger and gate.
//!
//! Fast, thread-safe storage for development, testing and single-process
//! deployments that can afford to forget state on restart.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::{debug, instrument};

use warden_core::error::Result;
use warden_core::traits::{DepositLedger, NotificationGate};
use warden_core::types::{Reconciliation, UserId};

/// In-memory deposit ledger.
///
/// `reconcile` holds the shard lock for the user's entry while it compares
/// and updates, so concurrent calls for one user are serialized.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: DashMap<UserId, u64>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all entries (for export/backup).
    pub fn entries(&self) -> Vec<(UserId, u64)> {
        self.entries
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

#[async_trait]
impl DepositLedger for MemoryLedger {
    #[instrument(skip(self), fields(user = %user))]
    async fn reconcile(&self, user: UserId, observed: u64) -> Result<Reconciliation> {
        let mut entry = self.entries.entry(user).or_insert(0);
        let reconciliation = Reconciliation::compute(*entry, observed);
        *entry = reconciliation.cumulative;

        if reconciliation.is_deposit() {
            debug!(delta = reconciliation.delta, cumulative = reconciliation.cumulative, "Deposit recorded");
        }
        Ok(reconciliation)
    }

    async fn cumulative(&self, user: UserId) -> Result<Option<u64>> {
        Ok(self.entries.get(&user).map(|v| *v))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.len() as u64)
    }
}

/// In-memory notification gate.
#[derive(Debug, Default)]
pub struct MemoryGate {
    consumed: DashSet<UserId>,
}

impl MemoryGate {
    /// Creates an empty gate.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationGate for MemoryGate {
    async fn try_consume(&self, user: UserId) -> Result<bool> {
        Ok(self.consumed.insert(user))
    }

    async fn rollback(&self, user: UserId) -> Result<()> {
        self.consumed.remove(&user);
        Ok(())
    }

    async fn is_consumed(&self, user: UserId) -> Result<bool> {
        Ok(self.consumed.contains(&user))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.consumed.len() as u64)
    }
}
