//! On-disk persistence: snapshot codec, atomic commit, daily recovery logs,
//! log retention and user backups.

pub mod backup;
pub mod codec;
pub mod daily_log;
pub mod recovery;
pub mod retention;
pub mod snapshot;

pub use backup::BackupManager;
pub use codec::{DATE_FORMAT, Snapshot, SnapshotCodec};
pub use daily_log::DailyLogWriter;
pub use recovery::{RecoveryEngine, RecoveryReport};
pub use retention::RetentionPolicy;
pub use snapshot::{SnapshotWriter, StagedSnapshot};
