pub mod driver;
pub mod ticker;

pub use driver::{CycleStats, Driver};
pub use ticker::Ticker;
