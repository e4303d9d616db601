//! Append-only journal of served addresses.
//!
//! One JSON object per line. Holds public data only: no secret material
//! ever reaches this file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use warden_core::error::{Result, WardenError};
use warden_core::types::{UserId, WalletAddress};

/// One journal line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// When the address was served
    pub timestamp: DateTime<Utc>,
    /// User the address belongs to
    pub user_id: UserId,
    /// Derived public address
    pub address: WalletAddress,
}

/// Address journal writer.
#[derive(Debug)]
pub struct AddressJournal {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AddressJournal {
    /// Creates a journal appending to `path`. The file is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record.
    #[instrument(skip(self, address), fields(user = %user_id))]
    pub async fn record(&self, user_id: UserId, address: &WalletAddress) -> Result<()> {
        let record = JournalRecord {
            timestamp: Utc::now(),
            user_id,
            address: *address,
        };

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                WardenError::PersistenceError(format!(
                    "failed to open journal {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!(address = %record.address, "Address journaled");
        Ok(())
    }

    /// Reads every record back.
    pub async fn read_all(&self) -> Result<Vec<JournalRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(WardenError::from))
            .collect()
    }
}
