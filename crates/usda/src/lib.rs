//! USDA PLANTS service access: configuration, backoff, the HTTP client, and
//! the rate-limited fetcher.

pub mod backoff;
pub mod client;
pub mod config;
pub mod fetch;

pub use backoff::BackoffPolicy;
pub use client::{PlantsApi, PlantsClient};
pub use config::FetchConfig;
pub use fetch::{FetchOutcome, Fetcher};
