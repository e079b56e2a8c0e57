//! The daily study target, persisted on its own in a small JSON file.

use crate::core::{Result, StoreError};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Daily study goal in hours, always within `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StudyTarget(u8);

impl StudyTarget {
    pub const RANGE: RangeInclusive<i64> = 1..=8;
    pub const DEFAULT: StudyTarget = StudyTarget(4);

    pub fn new(hours: i64) -> Result<Self> {
        if Self::RANGE.contains(&hours) {
            Ok(Self(hours as u8))
        } else {
            Err(StoreError::ValidationError(format!(
                "study target {} outside {}..={}",
                hours,
                Self::RANGE.start(),
                Self::RANGE.end()
            )))
        }
    }

    /// `hours` if valid, otherwise [`StudyTarget::DEFAULT`].
    pub fn clamped(hours: i64) -> Self {
        Self::new(hours).unwrap_or(Self::DEFAULT)
    }

    pub fn hours(self) -> u8 {
        self.0
    }
}

impl Default for StudyTarget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    study_target_hour: Option<i64>,
}

/// Reads and writes the target file. Writes overwrite in place.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the target. Any problem with the file, and any out-of-range value,
    /// yields the default.
    pub fn load(&self) -> StudyTarget {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at '{}', using defaults", self.path.display());
                return StudyTarget::DEFAULT;
            }
            Err(e) => {
                error!("Failed to read config '{}': {}", self.path.display(), e);
                return StudyTarget::DEFAULT;
            }
        };
        if data.is_empty() {
            warn!("Config '{}' is empty, using defaults", self.path.display());
            return StudyTarget::DEFAULT;
        }

        let document: ConfigDocument = match serde_json::from_slice(&data) {
            Ok(document) => document,
            Err(e) => {
                error!("Failed to parse config '{}': {}", self.path.display(), e);
                return StudyTarget::DEFAULT;
            }
        };

        match document.study_target_hour {
            Some(hours) => StudyTarget::new(hours).unwrap_or_else(|e| {
                warn!("{}, using {}", e, StudyTarget::DEFAULT.hours());
                StudyTarget::DEFAULT
            }),
            None => StudyTarget::DEFAULT,
        }
    }

    pub fn save(&self, target: StudyTarget) -> Result<()> {
        let document = ConfigDocument {
            study_target_hour: Some(i64::from(target.hours())),
        };
        let bytes = serde_json::to_vec(&document)
            .map_err(|e| StoreError::ParseError(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::OpenFailed(parent.to_path_buf(), e.to_string()))?;
        }
        fs::write(&self.path, bytes)
            .map_err(|e| StoreError::WriteFailed(self.path.clone(), e.to_string()))?;
        debug!("Saved config to '{}'", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_out_of_range_values_clamp_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("study_config.json"));

        for body in [r#"{"studyTargetHour":0}"#, r#"{"studyTargetHour":12}"#, r#"{"studyTargetHour":-3}"#] {
            fs::write(store.path(), body).unwrap();
            assert_eq!(store.load().hours(), 4, "body {}", body);
        }
    }

    #[test]
    fn test_missing_empty_or_corrupt_file_uses_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("study_config.json"));
        assert_eq!(store.load(), StudyTarget::DEFAULT);

        fs::write(store.path(), b"").unwrap();
        assert_eq!(store.load(), StudyTarget::DEFAULT);

        fs::write(store.path(), b"{oops").unwrap();
        assert_eq!(store.load(), StudyTarget::DEFAULT);

        fs::write(store.path(), b"{}").unwrap();
        assert_eq!(store.load(), StudyTarget::DEFAULT);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("study_config.json"));
        store.save(StudyTarget::new(6).unwrap()).unwrap();

        assert_eq!(store.load().hours(), 6);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            r#"{"studyTargetHour":6}"#
        );
    }

    #[test]
    fn test_validation() {
        assert!(StudyTarget::new(1).is_ok());
        assert!(StudyTarget::new(8).is_ok());
        assert!(matches!(StudyTarget::new(9), Err(StoreError::ValidationError(_))));
        assert_eq!(StudyTarget::clamped(0), StudyTarget::DEFAULT);
    }
}
