use crate::core::DEFAULT_STUDY_KIND;
use std::path::{Path, PathBuf};

/// Default number of days a daily log is kept.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// File and directory layout of a daybook, plus store-wide policy.
///
/// Every path is resolved against `root`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Data directory holding the snapshot, config file and log directory
    pub root: PathBuf,

    /// Primary snapshot file name
    pub snapshot_file: String,

    /// Target-hours config file name
    pub config_file: String,

    /// Daily log directory name
    pub log_dir: String,

    /// Days a daily log survives before pruning
    pub retention_days: u32,

    /// Activity label counted toward a day's study hours
    pub study_kind: String,

    /// Export the live state before restoring a backup over it
    pub restore_safety_backup: bool,
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            snapshot_file: "study_data.json".to_string(),
            config_file: "study_config.json".to_string(),
            log_dir: "logs".to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            study_kind: DEFAULT_STUDY_KIND.to_string(),
            restore_safety_backup: true,
        }
    }

    /// Platform data directory (`$XDG_DATA_HOME/daybook` and friends),
    /// or `./daybook-data` when the platform has none.
    pub fn default_location() -> Self {
        let root = dirs::data_dir()
            .map(|dir| dir.join("daybook"))
            .unwrap_or_else(|| PathBuf::from("daybook-data"));
        Self::new(root)
    }

    /// Set the snapshot file name
    pub fn snapshot_file(mut self, name: &str) -> Self {
        self.snapshot_file = name.to_string();
        self
    }

    /// Set the config file name
    pub fn config_file(mut self, name: &str) -> Self {
        self.config_file = name.to_string();
        self
    }

    /// Set the log directory name
    pub fn log_dir(mut self, name: &str) -> Self {
        self.log_dir = name.to_string();
        self
    }

    /// Set the log retention horizon
    pub fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Set the activity label that counts as study
    pub fn study_kind(mut self, kind: &str) -> Self {
        self.study_kind = kind.to_string();
        self
    }

    /// Enable or disable the pre-restore safety backup
    pub fn restore_safety_backup(mut self, enabled: bool) -> Self {
        self.restore_safety_backup = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(&self.snapshot_file)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(&self.config_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(&self.log_dir)
    }

    /// `<snapshot>.restore.bak`
    pub fn restore_backup_path(&self) -> PathBuf {
        self.root.join(format!("{}.restore.bak", self.snapshot_file))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::default_location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_under_root() {
        let config = StoreConfig::new("/data/daybook");
        assert_eq!(config.snapshot_path(), PathBuf::from("/data/daybook/study_data.json"));
        assert_eq!(config.config_path(), PathBuf::from("/data/daybook/study_config.json"));
        assert_eq!(config.log_path(), PathBuf::from("/data/daybook/logs"));
        assert_eq!(
            config.restore_backup_path(),
            PathBuf::from("/data/daybook/study_data.json.restore.bak")
        );
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new("/tmp/x")
            .snapshot_file("records.json")
            .log_dir("journal")
            .retention_days(30)
            .study_kind("学习")
            .restore_safety_backup(false);

        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/x/records.json"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/x/journal"));
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.study_kind, "学习");
        assert!(!config.restore_safety_backup);
    }
}
