//! Run orchestration: drives symbols through fetch and normalization
//! concurrently, then aggregates tables, failures, and the run summary.

pub mod progress;
pub mod run;
pub mod summary;

pub use progress::Progress;
pub use run::{run_harvest, HarvestReport};
pub use summary::RunSummary;
