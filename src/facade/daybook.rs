use crate::config::{Clock, ConfigStore, StoreConfig, StudyTarget, SystemClock};
use crate::core::{CommitError, DayRecord, Result, StoreError};
use crate::persistence::{
    BackupManager, DailyLogWriter, RecoveryEngine, RetentionPolicy, SnapshotWriter,
};
use crate::storage::{RecordStore, StreakCounter, StudyStats, stats};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Where the history came from when the daybook was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The primary snapshot parsed.
    Snapshot,
    /// The snapshot was unusable and the daily logs supplied at least one day.
    Recovered,
    /// Neither source had data; starting from a blank history.
    Empty,
}

/// The record store together with its persistence pipeline.
///
/// One instance is built at startup and handed to whatever needs the data.
/// Every mutating call commits the whole store, then refreshes today's
/// daily log, then prunes expired logs.
pub struct Daybook {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    records: RecordStore,
    streak: StreakCounter,
    target: StudyTarget,
    snapshots: SnapshotWriter,
    daily_log: DailyLogWriter,
    retention: RetentionPolicy,
    settings: ConfigStore,
    backups: BackupManager,
    load_source: LoadSource,
}

impl Daybook {
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Create the data directories, prune stale logs, then load the snapshot
    /// or fall back to log recovery.
    ///
    /// Only a failure to create the data directories is returned; every
    /// load problem degrades to recovery or an empty history.
    pub fn open_with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        for dir in [config.root().to_path_buf(), config.log_path()] {
            fs::create_dir_all(&dir)
                .map_err(|e| StoreError::OpenFailed(dir.clone(), e.to_string()))?;
        }

        let snapshots = SnapshotWriter::new(config.snapshot_path());
        let daily_log = DailyLogWriter::new(config.log_path());
        let retention = RetentionPolicy::new(config.retention_days);
        let settings = ConfigStore::new(config.config_path());
        let backups = BackupManager::new(
            config
                .restore_safety_backup
                .then(|| config.restore_backup_path()),
        );

        match retention.prune(daily_log.log_dir(), clock.today()) {
            Ok(0) => {}
            Ok(removed) => info!("Pruned {} expired daily logs", removed),
            Err(e) => warn!("Startup log pruning failed: {}", e),
        }

        let (records, max_continuous_days, load_source) = match snapshots.load() {
            Ok(snapshot) => {
                info!(
                    "Loaded {} days from '{}'",
                    snapshot.store.len(),
                    snapshots.path().display()
                );
                (snapshot.store, snapshot.max_continuous_days, LoadSource::Snapshot)
            }
            Err(e) => {
                warn!("Snapshot unusable ({}), recovering from daily logs", e);
                let report = RecoveryEngine::recover(daily_log.log_dir());
                if report.is_empty() {
                    info!("No recoverable history, starting empty");
                    (RecordStore::new(), 0, LoadSource::Empty)
                } else {
                    let snapshot = report.snapshot;
                    (snapshot.store, snapshot.max_continuous_days, LoadSource::Recovered)
                }
            }
        };

        let target = settings.load();

        Ok(Self {
            config,
            clock,
            records,
            streak: StreakCounter::new(max_continuous_days),
            target,
            snapshots,
            daily_log,
            retention,
            settings,
            backups,
            load_source,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Record for `date`, created empty if absent. Changes made through the
    /// returned reference are persisted by the next [`Daybook::commit`].
    pub fn day(&mut self, date: NaiveDate) -> &mut DayRecord {
        self.records.get(date)
    }

    pub fn peek(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.records.peek(date)
    }

    pub fn max_continuous_days(&self) -> u32 {
        self.streak.max_continuous_days()
    }

    pub fn current_streak(&self) -> u32 {
        StreakCounter::current_streak(&self.records, self.today())
    }

    pub fn stats(&self) -> StudyStats {
        StudyStats::collect(&self.records)
    }

    /// Records of the last `days` days ending today, newest first.
    pub fn recent(&self, days: u32) -> Vec<(NaiveDate, &DayRecord)> {
        stats::recent(&self.records, self.today(), days)
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Confirm `kind` at `hour` on `date` as done, then commit.
    pub fn schedule(&mut self, date: NaiveDate, hour: u8, kind: &str) -> Result<()> {
        let study_kind = self.config.study_kind.clone();
        self.records.get(date).schedule(hour, kind, true, &study_kind)?;
        self.commit()?;
        Ok(())
    }

    /// Set the completion flag of an existing slot, then commit.
    /// Returns `false` (and commits nothing) when the slot is empty.
    pub fn set_completed(&mut self, date: NaiveDate, hour: u8, completed: bool) -> Result<bool> {
        let study_kind = self.config.study_kind.clone();
        if !self.records.get(date).set_completed(hour, completed, &study_kind)? {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Remove the slot at `hour` on `date`, then commit.
    pub fn clear_hour(&mut self, date: NaiveDate, hour: u8) -> Result<()> {
        let study_kind = self.config.study_kind.clone();
        self.records.get(date).unschedule(hour, &study_kind)?;
        self.commit()?;
        Ok(())
    }

    /// Reset `date` to an empty record, then commit.
    pub fn clear_day(&mut self, date: NaiveDate) -> Result<()> {
        self.records.set(date, DayRecord::new());
        self.commit()?;
        Ok(())
    }

    /// Refresh the streak, commit the snapshot, then write today's log and
    /// prune. Only the snapshot commit can fail this call.
    pub fn commit(&mut self) -> std::result::Result<(), CommitError> {
        let today = self.today();
        let max_continuous_days = self.streak.refresh(&self.records, today);

        if let Err(e) = self.snapshots.commit(&self.records, max_continuous_days) {
            error!("Snapshot commit failed: {}", e);
            return Err(e);
        }

        self.write_daily_log(max_continuous_days, today);
        Ok(())
    }

    /// Secondary half of a commit: today's log, then retention. Never fails
    /// the caller.
    fn write_daily_log(&self, max_continuous_days: u32, today: NaiveDate) {
        match self.daily_log.append_today(&self.records, max_continuous_days, today) {
            Ok(_) => match self.retention.prune(self.daily_log.log_dir(), today) {
                Ok(0) => {}
                Ok(removed) => debug!("Pruned {} expired daily logs", removed),
                Err(e) => warn!("Log pruning failed: {}", e),
            },
            Err(e) => warn!("Daily log write failed: {}", e),
        }
    }

    /// Final best-effort flush. Failures are only logged.
    pub fn shutdown(mut self) {
        if let Err(e) = self.commit() {
            error!("Final commit at shutdown failed: {}", e);
        }
        if let Err(e) = self.settings.save(self.target) {
            error!("Saving config at shutdown failed: {}", e);
        }
        info!("Daybook closed with {} days", self.records.len());
    }

    // ------------------------------------------------------------------------
    // Target hours
    // ------------------------------------------------------------------------

    pub fn target_hours(&self) -> u8 {
        self.target.hours()
    }

    /// Validate and persist a new daily target.
    pub fn set_target_hours(&mut self, hours: i64) -> Result<()> {
        let target = StudyTarget::new(hours)?;
        self.target = target;
        self.settings.save(target)
    }

    // ------------------------------------------------------------------------
    // Backup and restore
    // ------------------------------------------------------------------------

    pub fn create_backup(&self, path: &Path) -> Result<()> {
        self.backups
            .create_backup(&self.records, self.streak.max_continuous_days(), path)
            .inspect_err(|e| error!("Backup to '{}' failed: {}", path.display(), e))
    }

    /// Where the live history is exported before a restore, if enabled.
    pub fn safety_backup_path(&self) -> Option<&Path> {
        self.backups.safety_backup()
    }

    /// Replace the whole history with the backup at `path`.
    pub fn restore_from_backup(&mut self, path: &Path) -> Result<usize> {
        let days = self
            .backups
            .restore_from_backup(path, &mut self.records, &mut self.streak, &self.snapshots)
            .inspect_err(|e| error!("Restore from '{}' failed: {}", path.display(), e))?;
        self.write_daily_log(self.streak.max_continuous_days(), self.today());
        Ok(days)
    }
}

impl fmt::Debug for Daybook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Daybook")
            .field("root", &self.config.root())
            .field("days", &self.records.len())
            .field("max_continuous_days", &self.streak.max_continuous_days())
            .field("target_hours", &self.target.hours())
            .field("load_source", &self.load_source)
            .finish()
    }
}
