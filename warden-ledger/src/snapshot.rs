//! Atomic snapshot files.
//!
//! # File Format
//!
//! ```text
//! magic (4 bytes): store-specific tag
//! version (1 byte): 1
//! count (8 bytes): number of records, little endian
//! records (variable): JSON array
//! ```
//!
//! Writes go to `<path>.tmp`, are fsynced, then renamed over `<path>`, so a
//! crash leaves either the old or the new snapshot, never a torn one.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use warden_core::constants::STORE_FORMAT_VERSION;
use warden_core::error::{Result, WardenError};

const HEADER_LEN: usize = 13;

/// A snapshot file with a fixed magic tag.
#[derive(Debug)]
pub(crate) struct SnapshotFile {
    path: PathBuf,
    magic: &'static [u8; 4],
}

impl SnapshotFile {
    pub(crate) fn new(path: impl AsRef<Path>, magic: &'static [u8; 4]) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            magic,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records, or `None` if the file does not exist yet.
    pub(crate) async fn load<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>> {
        let mut file = match fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(WardenError::PersistenceError(format!(
                    "failed to open {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        if contents.len() < HEADER_LEN {
            return Err(WardenError::PersistenceError(format!(
                "{} is too short",
                self.path.display()
            )));
        }

        if &contents[0..4] != self.magic {
            return Err(WardenError::PersistenceError(format!(
                "{} has invalid magic bytes",
                self.path.display()
            )));
        }

        let version = contents[4];
        if version != STORE_FORMAT_VERSION {
            return Err(WardenError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                actual: version,
            });
        }

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&contents[5..HEADER_LEN]);
        let count = u64::from_le_bytes(count_bytes);

        let records: Vec<T> = serde_json::from_slice(&contents[HEADER_LEN..]).map_err(|e| {
            WardenError::PersistenceError(format!("{} is corrupt: {}", self.path.display(), e))
        })?;

        if records.len() as u64 != count {
            return Err(WardenError::PersistenceError(format!(
                "{} declares {} records but holds {}",
                self.path.display(),
                count,
                records.len()
            )));
        }

        debug!(count, path = ?self.path, "Snapshot loaded");
        Ok(Some(records))
    }

    /// Atomically replaces the snapshot with `records`.
    pub(crate) async fn save<T: Serialize>(&self, records: &[T]) -> Result<()> {
        self.write(records).await.map_err(|e| {
            WardenError::PersistenceError(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    async fn write<T: Serialize>(&self, records: &[T]) -> Result<()> {
        let serialized = serde_json::to_vec(records)?;

        let mut contents = Vec::with_capacity(HEADER_LEN + serialized.len());
        contents.extend_from_slice(self.magic);
        contents.push(STORE_FORMAT_VERSION);
        contents.extend_from_slice(&(records.len() as u64).to_le_bytes());
        contents.extend_from_slice(&serialized);

        let temp_path = self.path.with_extension("tmp");
        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&contents).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?temp_path, error = %cleanup, "Failed to remove temp snapshot");
                }
            }
            return Err(e.into());
        }

        // Make the rename itself durable.
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = fs::File::open(parent).await {
                let _ = dir.sync_all().await;
            }
        }

        debug!(count = records.len(), path = ?self.path, "Snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MAGIC: &[u8; 4] = b"TEST";

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("s.bin"), MAGIC);
        assert!(snapshot.load::<u64>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("s.bin"), MAGIC);

        snapshot.save(&[1u64, 2, 3]).await.unwrap();
        assert_eq!(snapshot.load::<u64>().await.unwrap().unwrap(), vec![1, 2, 3]);
        assert!(!dir.path().join("s.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_wrong_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        SnapshotFile::new(&path, b"AAAA").save(&[1u64]).await.unwrap();

        let err = SnapshotFile::new(&path, b"BBBB").load::<u64>().await.unwrap_err();
        assert!(err.is_persistence_error());
    }

    #[tokio::test]
    async fn test_rejects_wrong_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let mut bytes = MAGIC.to_vec();
        bytes.push(STORE_FORMAT_VERSION + 1);
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(b"[]");
        fs::write(&path, bytes).await.unwrap();

        let err = SnapshotFile::new(&path, MAGIC).load::<u64>().await.unwrap_err();
        assert!(matches!(err, WardenError::VersionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_rejects_truncated_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let snapshot = SnapshotFile::new(&path, MAGIC);
        snapshot.save(&[10u64, 20, 30]).await.unwrap();

        let bytes = fs::read(&path).await.unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).await.unwrap();

        assert!(snapshot.load::<u64>().await.unwrap_err().is_persistence_error());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_snapshot() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).await.unwrap();
        let snapshot = SnapshotFile::new(sub.join("s.bin"), MAGIC);
        snapshot.save(&[1u64]).await.unwrap();

        // Replace the data file with a directory so the rename fails.
        let blocker = SnapshotFile::new(&sub, MAGIC);
        let err = blocker.save(&[2u64]).await.unwrap_err();
        assert!(err.is_persistence_error());

        assert_eq!(snapshot.load::<u64>().await.unwrap().unwrap(), vec![1]);
    }
}
