//! File-backed ledger and gate.
//!
//! Every change is written to disk before it is acknowledged. If the write
//! fails the in-memory state is reverted and the caller gets a
//! `PersistenceError`, so a retry after recovery sees exactly the old state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use warden_core::constants::{GATE_FILE_MAGIC, LEDGER_FILE_MAGIC};
use warden_core::error::Result;
use warden_core::traits::{DepositLedger, NotificationGate};
use warden_core::types::{Reconciliation, UserId};

use crate::snapshot::SnapshotFile;

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// One persisted ledger record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// User the watermark belongs to
    pub user_id: UserId,
    /// Highest confirmed balance ever observed, in lamports
    pub cumulative: u64,
}

/// File-backed deposit ledger.
///
/// Holds the whole table in memory behind one async mutex and rewrites the
/// snapshot on every change. Suitable for the handful-of-thousands of users
/// a single bot serves.
#[derive(Debug)]
pub struct FileLedger {
    file: SnapshotFile,
    entries: Mutex<BTreeMap<UserId, u64>>,
}

impl FileLedger {
    /// Opens the ledger at `path`, loading existing entries.
    ///
    /// A missing file is an empty ledger. A corrupt or foreign file is an
    /// error rather than silently starting over.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = SnapshotFile::new(path, LEDGER_FILE_MAGIC);
        let records: Vec<LedgerEntry> = file.load().await?.unwrap_or_default();

        info!(count = records.len(), path = ?file.path(), "Deposit ledger opened");

        let entries = records
            .into_iter()
            .map(|entry| (entry.user_id, entry.cumulative))
            .collect();

        Ok(Self {
            file,
            entries: Mutex::new(entries),
        })
    }

    /// Returns all entries ordered by user id.
    pub async fn entries(&self) -> Vec<LedgerEntry> {
        Self::records(&*self.entries.lock().await)
    }

    fn records(entries: &BTreeMap<UserId, u64>) -> Vec<LedgerEntry> {
        entries
            .iter()
            .map(|(&user_id, &cumulative)| LedgerEntry { user_id, cumulative })
            .collect()
    }
}

#[async_trait]
impl DepositLedger for FileLedger {
    #[instrument(skip(self), fields(user = %user))]
    async fn reconcile(&self, user: UserId, observed: u64) -> Result<Reconciliation> {
        let mut entries = self.entries.lock().await;

        let previous = entries.get(&user).copied();
        let reconciliation = Reconciliation::compute(previous.unwrap_or(0), observed);

        if previous.is_some() && !reconciliation.is_deposit() {
            return Ok(reconciliation);
        }

        entries.insert(user, reconciliation.cumulative);
        if let Err(e) = self.file.save(&Self::records(&entries)).await {
            match previous {
                Some(value) => entries.insert(user, value),
                None => entries.remove(&user),
            };
            error!(error = %e, "Ledger write failed, watermark unchanged");
            return Err(e);
        }

        debug!(
            prior = reconciliation.prior,
            cumulative = reconciliation.cumulative,
            delta = reconciliation.delta,
            "Watermark persisted"
        );
        Ok(reconciliation)
    }

    async fn cumulative(&self, user: UserId) -> Result<Option<u64>> {
        Ok(self.entries.lock().await.get(&user).copied())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.lock().await.len() as u64)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GATE
// ═══════════════════════════════════════════════════════════════════════════════

/// File-backed notification gate.
#[derive(Debug)]
pub struct FileGate {
    file: SnapshotFile,
    consumed: Mutex<BTreeSet<UserId>>,
}

impl FileGate {
    /// Opens the gate at `path`, loading users already announced.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = SnapshotFile::new(path, GATE_FILE_MAGIC);
        let records: Vec<UserId> = file.load().await?.unwrap_or_default();

        info!(count = records.len(), path = ?file.path(), "Notification gate opened");

        Ok(Self {
            file,
            consumed: Mutex::new(records.into_iter().collect()),
        })
    }

    async fn persist(&self, consumed: &BTreeSet<UserId>) -> Result<()> {
        let records: Vec<UserId> = consumed.iter().copied().collect();
        self.file.save(&records).await
    }
}

#[async_trait]
impl NotificationGate for FileGate {
    #[instrument(skip(self), fields(user = %user))]
    async fn try_consume(&self, user: UserId) -> Result<bool> {
        let mut consumed = self.consumed.lock().await;

        if !consumed.insert(user) {
            return Ok(false);
        }

        if let Err(e) = self.persist(&consumed).await {
            consumed.remove(&user);
            error!(error = %e, "Gate write failed, user not marked");
            return Err(e);
        }

        debug!("Gate consumed");
        Ok(true)
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn rollback(&self, user: UserId) -> Result<()> {
        let mut consumed = self.consumed.lock().await;

        if !consumed.remove(&user) {
            return Ok(());
        }

        if let Err(e) = self.persist(&consumed).await {
            consumed.insert(user);
            error!(error = %e, "Gate rollback write failed, user stays marked");
            return Err(e);
        }

        info!("Gate rolled back");
        Ok(())
    }

    async fn is_consumed(&self, user: UserId) -> Result<bool> {
        Ok(self.consumed.lock().await.contains(&user))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.consumed.lock().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio::task::JoinSet;

    const SOL: u64 = 1_000_000_000;

    #[tokio::test]
    async fn test_ledger_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.bin");
        let user = UserId::new(42);

        {
            let ledger = FileLedger::open(&path).await.unwrap();
            ledger.reconcile(user, 0).await.unwrap();
            ledger.reconcile(user, 3 * SOL / 2).await.unwrap();
            ledger.reconcile(UserId::new(-5), 10).await.unwrap();
        }

        let ledger = FileLedger::open(&path).await.unwrap();
        assert_eq!(ledger.cumulative(user).await.unwrap(), Some(3 * SOL / 2));
        assert_eq!(ledger.cumulative(UserId::new(-5)).await.unwrap(), Some(10));
        assert_eq!(ledger.count().await.unwrap(), 2);

        // Same balance after restart is not a new deposit.
        let r = ledger.reconcile(user, 3 * SOL / 2).await.unwrap();
        assert!(!r.is_deposit());
    }

    #[tokio::test]
    async fn test_zero_balance_entry_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.bin");

        FileLedger::open(&path).await.unwrap().reconcile(UserId::new(1), 0).await.unwrap();

        let ledger = FileLedger::open(&path).await.unwrap();
        assert_eq!(ledger.cumulative(UserId::new(1)).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_ledger_rejects_gate_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        let gate = FileGate::open(&path).await.unwrap();
        gate.try_consume(UserId::new(1)).await.unwrap();

        let err = FileLedger::open(&path).await.unwrap_err();
        assert!(err.is_persistence_error());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_watermark_unchanged() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        tokio::fs::create_dir(&data_dir).await.unwrap();
        let path = data_dir.join("ledger.bin");
        let user = UserId::new(42);

        let ledger = FileLedger::open(&path).await.unwrap();
        ledger.reconcile(user, SOL).await.unwrap();

        tokio::fs::remove_dir_all(&data_dir).await.unwrap();
        let err = ledger.reconcile(user, 3 * SOL).await.unwrap_err();
        assert!(err.is_persistence_error());
        assert_eq!(ledger.cumulative(user).await.unwrap(), Some(SOL));

        // After recovery the retry observes the full delta.
        tokio::fs::create_dir(&data_dir).await.unwrap();
        let r = ledger.reconcile(user, 3 * SOL).await.unwrap();
        assert_eq!(r.prior, SOL);
        assert_eq!(r.delta, 2 * SOL);
    }

    #[tokio::test]
    async fn test_failed_first_write_leaves_no_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("ledger.bin");

        let ledger = FileLedger::open(&path).await.unwrap();
        assert!(ledger.reconcile(UserId::new(1), 5).await.is_err());
        assert_eq!(ledger.cumulative(UserId::new(1)).await.unwrap(), None);
        assert_eq!(ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_reconcile_counts_deposit_once() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(FileLedger::open(dir.path().join("ledger.bin")).await.unwrap());
        let user = UserId::new(9);
        let mut tasks = JoinSet::new();

        for _ in 0..8 {
            let ledger = ledger.clone();
            tasks.spawn(async move { ledger.reconcile(user, 2 * SOL).await.unwrap().delta });
        }

        let mut total = 0;
        while let Some(delta) = tasks.join_next().await {
            total += delta.unwrap();
        }
        assert_eq!(total, 2 * SOL);
    }

    #[tokio::test]
    async fn test_gate_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notified.bin");
        let user = UserId::new(42);

        assert!(FileGate::open(&path).await.unwrap().try_consume(user).await.unwrap());

        let gate = FileGate::open(&path).await.unwrap();
        assert!(gate.is_consumed(user).await.unwrap());
        assert!(!gate.try_consume(user).await.unwrap());
    }

    #[tokio::test]
    async fn test_gate_rollback_is_durable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notified.bin");
        let user = UserId::new(42);

        let gate = FileGate::open(&path).await.unwrap();
        assert!(gate.try_consume(user).await.unwrap());
        gate.rollback(user).await.unwrap();

        let gate = FileGate::open(&path).await.unwrap();
        assert!(!gate.is_consumed(user).await.unwrap());
        assert!(gate.try_consume(user).await.unwrap());
    }

    #[tokio::test]
    async fn test_gate_failed_write_does_not_mark() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        tokio::fs::create_dir(&data_dir).await.unwrap();
        let gate = FileGate::open(data_dir.join("notified.bin")).await.unwrap();
        let user = UserId::new(3);

        tokio::fs::remove_dir_all(&data_dir).await.unwrap();
        assert!(gate.try_consume(user).await.unwrap_err().is_persistence_error());
        assert!(!gate.is_consumed(user).await.unwrap());

        tokio::fs::create_dir(&data_dir).await.unwrap();
        assert!(gate.try_consume(user).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_gate_single_winner() {
        let dir = tempdir().unwrap();
        let gate = Arc::new(FileGate::open(dir.path().join("notified.bin")).await.unwrap());
        let user = UserId::new(1);
        let mut tasks = JoinSet::new();

        for _ in 0..16 {
            let gate = gate.clone();
            tasks.spawn(async move { gate.try_consume(user).await.unwrap() });
        }

        let mut winners = 0;
        while let Some(won) = tasks.join_next().await {
            if won.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_watermark_is_running_max(observations in prop::collection::vec(0u64..10 * SOL, 1..12)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let dir = tempdir().unwrap();
                let ledger = FileLedger::open(dir.path().join("ledger.bin")).await.unwrap();
                let user = UserId::new(1);

                let mut max = 0;
                let mut total_delta = 0;
                for observed in &observations {
                    let r = ledger.reconcile(user, *observed).await.unwrap();
                    max = max.max(*observed);
                    total_delta += r.delta;
                    assert_eq!(r.cumulative, max);
                    assert!(r.cumulative >= r.prior);
                }
                assert_eq!(total_delta, max);
            });
        }
    }
}
