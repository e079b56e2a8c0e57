// ============================================================================
// Daybook Library
// ============================================================================

pub mod config;
pub mod core;
pub mod facade;
pub mod persistence;
pub mod storage;

// Re-export main types for convenience
pub use config::{Clock, FixedClock, StoreConfig, StudyTarget, SystemClock};
pub use crate::core::{Activity, CommitError, DayRecord, Result, StoreError};
pub use facade::{Daybook, LoadSource};
pub use persistence::{
    BackupManager, DailyLogWriter, RecoveryEngine, RecoveryReport, RetentionPolicy, Snapshot,
    SnapshotCodec, SnapshotWriter,
};
pub use storage::{RecordStore, StreakCounter, StudyStats};
