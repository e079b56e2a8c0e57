//! User-initiated export and import of the full record history.

use super::codec::{Snapshot, SnapshotCodec};
use super::snapshot::{SnapshotWriter, read_snapshot, remove_quietly, with_suffix, write_verified};
use crate::core::{Result, StoreError};
use crate::storage::{RecordStore, StreakCounter};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct BackupManager {
    safety_backup: Option<PathBuf>,
}

impl BackupManager {
    /// `safety_backup`: where the live state is exported before a restore
    /// replaces it. `None` skips that step.
    pub fn new(safety_backup: Option<PathBuf>) -> Self {
        Self { safety_backup }
    }

    pub fn safety_backup(&self) -> Option<&Path> {
        self.safety_backup.as_deref()
    }

    /// Export `store` to `path` via a verified temp file and a direct rename.
    /// An existing file at `path` is overwritten without rotation.
    pub fn create_backup(&self, store: &RecordStore, max_continuous_days: u32, path: &Path) -> Result<()> {
        let bytes = SnapshotCodec::encode(store, max_continuous_days)?;
        let temp_path = with_suffix(path, ".tmp");
        write_verified(&temp_path, &bytes)?;

        if let Err(e) = fs::rename(&temp_path, path) {
            remove_quietly(&temp_path);
            return Err(StoreError::WriteFailed(path.to_path_buf(), e.to_string()));
        }
        info!("Created backup of {} days at '{}'", store.len(), path.display());
        Ok(())
    }

    /// Fully decode a backup without touching any live state.
    pub fn read_backup(&self, path: &Path) -> Result<Snapshot> {
        read_snapshot(path)
    }

    /// Replace the live history with the backup at `path`, then commit it.
    ///
    /// The backup is decoded completely before anything changes, so a missing
    /// or corrupt file leaves `store` and `streak` as they were. Once decoding
    /// succeeds the in-memory swap happens even if the following commit fails;
    /// that failure is returned. Returns the number of restored days.
    pub fn restore_from_backup(
        &self,
        path: &Path,
        store: &mut RecordStore,
        streak: &mut StreakCounter,
        writer: &SnapshotWriter,
    ) -> Result<usize> {
        let restored = self.read_backup(path)?;

        if let Some(safety) = &self.safety_backup {
            if let Err(e) = self.create_backup(store, streak.max_continuous_days(), safety) {
                warn!("Continuing restore without safety backup: {}", e);
            }
        }

        let days = restored.store.len();
        store.replace_all(restored.store);
        *streak = StreakCounter::new(restored.max_continuous_days);
        writer.commit(store, streak.max_continuous_days())?;

        info!("Restored {} days from '{}'", days, path.display());
        Ok(days)
    }
}
