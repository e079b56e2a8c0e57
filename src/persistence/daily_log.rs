//! Per-day secondary copy of the record, used only for disaster recovery.

use super::codec::{DATE_FORMAT, SnapshotCodec};
use crate::core::{Result, StoreError};
use crate::storage::RecordStore;
use chrono::NaiveDate;
use log::debug;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LOG_EXTENSION: &str = "json";

pub struct DailyLogWriter {
    log_dir: PathBuf,
}

impl DailyLogWriter {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// `<log_dir>/<yyyy-MM-dd>.json`
    pub fn log_path(&self, date: NaiveDate) -> PathBuf {
        self.log_dir
            .join(format!("{}.{}", date.format(DATE_FORMAT), LOG_EXTENSION))
    }

    /// Overwrite `today`'s log with the store's entry for `today`.
    ///
    /// Written in place without a temp file. A torn log only costs the
    /// recovery path one day, and the next commit rewrites it.
    pub fn append_today(
        &self,
        store: &RecordStore,
        max_continuous_days: u32,
        today: NaiveDate,
    ) -> Result<PathBuf> {
        let bytes = SnapshotCodec::encode_day(store, today, max_continuous_days)?;
        let path = self.log_path(today);

        fs::create_dir_all(&self.log_dir)
            .map_err(|e| StoreError::OpenFailed(self.log_dir.clone(), e.to_string()))?;
        let mut file =
            File::create(&path).map_err(|e| StoreError::OpenFailed(path.clone(), e.to_string()))?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::WriteFailed(path.clone(), e.to_string()))?;

        debug!("Wrote daily log '{}' ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Regular `*.json` files directly under `log_dir`. A missing directory
/// yields an empty list.
pub(crate) fn list_log_files(log_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let is_log = path.extension().is_some_and(|ext| ext == LOG_EXTENSION);
        if is_file && is_log {
            files.push(path);
        }
    }
    Ok(files)
}

/// Date encoded in the first ten characters of a log file name.
pub(crate) fn log_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let prefix = name.get(..10)?;
    NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEFAULT_STUDY_KIND;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_log_contains_only_today() {
        let temp_dir = TempDir::new().unwrap();
        let writer = DailyLogWriter::new(temp_dir.path().join("logs"));
        let mut store = RecordStore::new();
        store
            .get(date(2024, 1, 1))
            .schedule(9, "study", true, DEFAULT_STUDY_KIND)
            .unwrap();
        store
            .get(date(2024, 1, 2))
            .schedule(10, "study", true, DEFAULT_STUDY_KIND)
            .unwrap();

        let path = writer.append_today(&store, 2, date(2024, 1, 2)).unwrap();
        assert_eq!(path, temp_dir.path().join("logs").join("2024-01-02.json"));

        let decoded = SnapshotCodec::decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(decoded.store.len(), 1);
        assert_eq!(decoded.store.peek(date(2024, 1, 2)), store.peek(date(2024, 1, 2)));
        assert_eq!(decoded.max_continuous_days, 2);
    }

    #[test]
    fn test_log_is_rewritten_each_time() {
        let temp_dir = TempDir::new().unwrap();
        let writer = DailyLogWriter::new(temp_dir.path());
        let today = date(2024, 5, 5);
        let mut store = RecordStore::new();

        writer.append_today(&store, 0, today).unwrap();
        store
            .get(today)
            .schedule(8, "study", true, DEFAULT_STUDY_KIND)
            .unwrap();
        writer.append_today(&store, 1, today).unwrap();

        let decoded = SnapshotCodec::decode(&fs::read(writer.log_path(today)).unwrap()).unwrap();
        assert_eq!(decoded.store.peek(today).unwrap().study_hours, 1);
    }

    #[test]
    fn test_log_date_from_file_name() {
        assert_eq!(log_date(Path::new("/x/2024-03-09.json")), Some(date(2024, 3, 9)));
        assert_eq!(log_date(Path::new("2024-03-09-extra.json")), Some(date(2024, 3, 9)));
        assert_eq!(log_date(Path::new("notes.json")), None);
        assert_eq!(log_date(Path::new("2024-02-30.json")), None);
    }

    #[test]
    fn test_list_log_files_filters_extension() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("2024-01-01.json"), b"{}").unwrap();
        fs::write(temp_dir.path().join("2024-01-02.txt"), b"{}").unwrap();
        fs::create_dir(temp_dir.path().join("2024-01-03.json")).unwrap();

        let files = list_log_files(temp_dir.path()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("2024-01-01.json")]);
        assert!(list_log_files(&temp_dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_log_dir_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("logs");
        fs::write(&blocker, b"not a directory").unwrap();

        let writer = DailyLogWriter::new(&blocker);
        let result = writer.append_today(&RecordStore::new(), 0, date(2024, 1, 1));
        assert!(matches!(result, Err(StoreError::OpenFailed(..))));
    }
}
