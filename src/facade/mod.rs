pub mod daybook;

pub use daybook::{Daybook, LoadSource};
