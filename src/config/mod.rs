pub mod clock;
pub mod store;
pub mod target;

pub use clock::{Clock, FixedClock, SystemClock};
pub use store::{DEFAULT_RETENTION_DAYS, StoreConfig};
pub use target::{ConfigStore, StudyTarget};
