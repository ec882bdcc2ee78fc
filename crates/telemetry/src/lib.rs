//! Internal telemetry for the plants harvester.
//!
//! Structured logging via tracing plus an in-process metrics registry whose
//! snapshot is logged at the end of a run.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
