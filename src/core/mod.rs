pub mod error;
pub mod types;

pub use error::{CommitError, Result, StoreError};
pub use types::{Activity, DEFAULT_STUDY_KIND, DayRecord, MAX_HOUR};
