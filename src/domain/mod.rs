pub mod outcome;
pub mod target;

pub use outcome::{ScrapeOutcome, Snapshot};
pub use target::{Target, TargetId};
