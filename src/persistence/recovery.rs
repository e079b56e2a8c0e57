//! Rebuild the record history from daily logs when the primary snapshot is
//! unusable.

use super::codec::Snapshot;
use super::daily_log::list_log_files;
use super::snapshot::read_snapshot;
use log::{debug, info, warn};
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What a recovery pass found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub snapshot: Snapshot,
    /// Log files in the order they were applied.
    pub scanned: Vec<PathBuf>,
    /// Logs that could not be read or parsed.
    pub skipped: usize,
    /// Days taken from the logs.
    pub recovered_days: usize,
}

impl RecoveryReport {
    pub fn is_empty(&self) -> bool {
        self.snapshot.store.is_empty()
    }
}

pub struct RecoveryEngine;

impl RecoveryEngine {
    /// Merge every parsable log under `log_dir`.
    ///
    /// Logs are applied most-recently-modified first, ties broken by file
    /// name descending. A date already taken from an earlier log is never
    /// overwritten. The streak is the largest value seen in any parsed log.
    /// Unreadable directories and logs are logged and yield an empty result.
    pub fn recover(log_dir: &Path) -> RecoveryReport {
        let mut report = RecoveryReport::default();

        let files = match list_log_files(log_dir) {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list logs in '{}': {}", log_dir.display(), e);
                return report;
            }
        };
        if files.is_empty() {
            debug!("No daily logs under '{}'", log_dir.display());
            return report;
        }

        for path in Self::recovery_order(files) {
            match read_snapshot(&path) {
                Ok(log) => {
                    report.snapshot.max_continuous_days = report
                        .snapshot
                        .max_continuous_days
                        .max(log.max_continuous_days);
                    for (date, record) in log.store.iter() {
                        if report.snapshot.store.insert_if_absent(*date, record.clone()) {
                            report.recovered_days += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!("Skipping log '{}': {}", path.display(), e);
                    report.skipped += 1;
                }
            }
            report.scanned.push(path);
        }

        info!(
            "Recovered {} days from {} logs ({} skipped), max streak {}",
            report.recovered_days,
            report.scanned.len(),
            report.skipped,
            report.snapshot.max_continuous_days
        );
        report
    }

    /// Newest modification time first, then file name descending.
    pub fn recovery_order(mut files: Vec<PathBuf>) -> Vec<PathBuf> {
        let modified = |path: &PathBuf| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH)
        };
        files.sort_by_cached_key(|path| {
            (
                Reverse(modified(path)),
                Reverse(path.file_name().map(|name| name.to_os_string())),
            )
        });
        files
    }
}
