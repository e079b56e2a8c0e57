pub mod record_store;
pub mod stats;
pub mod streak;

pub use record_store::RecordStore;
pub use stats::StudyStats;
pub use streak::StreakCounter;
