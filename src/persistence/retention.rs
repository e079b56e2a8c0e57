use super::daily_log::{list_log_files, log_date};
use crate::core::{Result, StoreError};
use chrono::NaiveDate;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Deletes daily logs older than `horizon_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    horizon_days: u32,
}

impl RetentionPolicy {
    pub fn new(horizon_days: u32) -> Self {
        Self { horizon_days }
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Whether a log dated `log_date` has outlived the horizon as of `today`.
    /// A log exactly `horizon_days` old is kept.
    pub fn is_expired(&self, log_date: NaiveDate, today: NaiveDate) -> bool {
        (today - log_date).num_days() > i64::from(self.horizon_days)
    }

    /// Remove expired logs under `log_dir`; returns how many were deleted.
    ///
    /// Files whose names do not start with a date are left alone, as are
    /// files that fail to delete (logged).
    pub fn prune(&self, log_dir: &Path, today: NaiveDate) -> Result<usize> {
        let files = list_log_files(log_dir)
            .map_err(|e| StoreError::OpenFailed(log_dir.to_path_buf(), e.to_string()))?;

        let mut removed = 0;
        for path in files {
            let Some(date) = log_date(&path) else {
                continue;
            };
            if !self.is_expired(date, today) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Pruned expired log '{}'", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to prune log '{}': {}", path.display(), e),
            }
        }
        Ok(removed)
    }
}
