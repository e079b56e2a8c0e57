//! Atomic commit of the primary snapshot file.
//!
//! A commit moves through temp-write, backup rotation and rename so that the
//! primary path only ever holds a complete snapshot: the previous one or the
//! new one.

use super::codec::{Snapshot, SnapshotCodec};
use crate::core::{CommitError, Result, StoreError};
use crate::storage::RecordStore;
use log::{debug, error, warn};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `path` with `suffix` appended to its file name (`a.json` -> `a.json.tmp`).
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Write `bytes` to `temp_path`, sync it, and verify the on-disk length.
/// The temp file is removed on any failure after it was created.
pub(crate) fn write_verified(temp_path: &Path, bytes: &[u8]) -> std::result::Result<(), CommitError> {
    if let Some(parent) = temp_path.parent() {
        fs::create_dir_all(parent).map_err(|e| CommitError::WriteFailed {
            path: temp_path.to_path_buf(),
            reason: format!("create directory '{}': {}", parent.display(), e),
        })?;
    }

    let mut file = File::create(temp_path).map_err(|e| CommitError::WriteFailed {
        path: temp_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let written = file
        .write_all(bytes)
        .and_then(|_| file.flush())
        .and_then(|_| file.sync_all());
    drop(file);
    if let Err(e) = written {
        remove_quietly(temp_path);
        return Err(CommitError::WriteFailed {
            path: temp_path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    verify_length(temp_path, bytes.len() as u64)
}

/// Check that `temp_path` holds exactly `expected` bytes, removing it if not.
fn verify_length(temp_path: &Path, expected: u64) -> std::result::Result<(), CommitError> {
    let on_disk = fs::metadata(temp_path).map(|m| m.len()).unwrap_or(0);
    if on_disk != expected {
        remove_quietly(temp_path);
        return Err(CommitError::PartialWrite {
            path: temp_path.to_path_buf(),
            expected,
            written: on_disk,
        });
    }
    Ok(())
}

/// Remove `path`, logging anything but a missing file.
pub(crate) fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Failed to remove '{}': {}", path.display(), e);
    }
}

/// Read a whole snapshot file, distinguishing absent and empty files from
/// unreadable and unparsable ones.
pub(crate) fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(StoreError::OpenFailed(path.to_path_buf(), e.to_string())),
    };
    if data.is_empty() {
        return Err(StoreError::Empty(path.to_path_buf()));
    }
    SnapshotCodec::decode(&data)
}

// ============================================================================
// Snapshot Writer
// ============================================================================

pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".bak")
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the primary snapshot.
    ///
    /// Fails with `NotFound`, `Empty`, `OpenFailed` or `ParseError`; each of
    /// these sends the caller to log recovery.
    pub fn load(&self) -> Result<Snapshot> {
        read_snapshot(&self.path)
    }

    /// Full commit: [`stage`](Self::stage) then [`StagedSnapshot::publish`].
    pub fn commit(
        &self,
        store: &RecordStore,
        max_continuous_days: u32,
    ) -> std::result::Result<(), CommitError> {
        self.stage(store, max_continuous_days)?.publish()
    }

    /// Encode `store` and write it, verified, to the temp path.
    /// The primary file is not touched.
    pub fn stage(
        &self,
        store: &RecordStore,
        max_continuous_days: u32,
    ) -> std::result::Result<StagedSnapshot<'_>, CommitError> {
        let bytes = SnapshotCodec::encode(store, max_continuous_days)
            .map_err(|e| CommitError::Encode(e.to_string()))?;

        let temp_path = self.temp_path();
        write_verified(&temp_path, &bytes)?;
        debug!(
            "Staged snapshot of {} days ({} bytes) at '{}'",
            store.len(),
            bytes.len(),
            temp_path.display()
        );

        Ok(StagedSnapshot {
            writer: self,
            temp_path,
        })
    }
}

/// A fully written temp snapshot that has not replaced the primary yet.
///
/// Dropping it without calling `publish` leaves the temp file behind and the
/// primary untouched, which is exactly what a crash at that point does.
#[must_use = "a staged snapshot does nothing until published"]
pub struct StagedSnapshot<'a> {
    writer: &'a SnapshotWriter,
    temp_path: PathBuf,
}

impl StagedSnapshot<'_> {
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Rotate the current primary to `.bak`, rename the temp file into place
    /// and drop the backup.
    pub fn publish(self) -> std::result::Result<(), CommitError> {
        let primary = self.writer.path();
        let backup = self.writer.backup_path();

        let backed_up = if primary.exists() {
            remove_quietly(&backup);
            fs::rename(primary, &backup).map_err(|e| CommitError::BackupFailed {
                path: primary.to_path_buf(),
                reason: e.to_string(),
            })?;
            debug!("Rotated '{}' to '{}'", primary.display(), backup.display());
            true
        } else {
            false
        };

        if let Err(e) = fs::rename(&self.temp_path, primary) {
            return Err(swap_failed(
                &self.temp_path,
                backed_up.then_some(backup.as_path()),
                primary,
                e.to_string(),
            ));
        }

        if backed_up {
            remove_quietly(&backup);
        }
        debug!("Committed snapshot to '{}'", primary.display());
        Ok(())
    }
}

/// Undo a rotation after the temp file could not be renamed into place.
///
/// The temp file is removed when the old primary is back (or there never was
/// one). If the rollback fails too, the temp file is kept: next to `.bak` it
/// may be the only complete copy of the newest state.
fn swap_failed(temp_path: &Path, backup: Option<&Path>, primary: &Path, reason: String) -> CommitError {
    let rolled_back = backup.is_some_and(|backup| rollback(backup, primary));
    if rolled_back || backup.is_none() {
        remove_quietly(temp_path);
    }
    CommitError::SwapFailed {
        path: primary.to_path_buf(),
        reason,
        rolled_back,
    }
}

fn rollback(backup: &Path, primary: &Path) -> bool {
    match fs::rename(backup, primary) {
        Ok(()) => {
            warn!("Restored '{}' from backup after failed swap", primary.display());
            true
        }
        Err(e) => {
            error!(
                "Failed to restore '{}' from '{}': {}",
                primary.display(),
                backup.display(),
                e
            );
            false
        }
    }
}
