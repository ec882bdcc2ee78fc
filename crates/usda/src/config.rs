//! Fetch layer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use harvester_core::{Error, Result};

use crate::backoff::BackoffPolicy;

/// Configuration for the USDA PLANTS fetch layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FetchConfig {
    /// Plant profile endpoint
    #[serde(default = "default_profile_url")]
    #[validate(url)]
    pub profile_url: String,
    /// Plant characteristics endpoint (plant id appended as a path segment)
    #[serde(default = "default_characteristics_url")]
    #[validate(url)]
    pub characteristics_url: String,
    /// Maximum concurrent in-flight requests
    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 64))]
    pub concurrency: usize,
    /// Attempt budget per endpoint call (first try included)
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
    /// First backoff delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    #[validate(range(min = 1))]
    pub base_delay_ms: u64,
    /// Cap on the grown backoff delay in milliseconds (before jitter)
    #[serde(default = "default_max_delay_ms")]
    #[validate(range(min = 1))]
    pub max_delay_ms: u64,
    /// Jitter as a fraction of the capped delay
    #[serde(default = "default_jitter")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub jitter: f64,
}

fn default_profile_url() -> String {
    "https://plantsservices.sc.egov.usda.gov/api/PlantProfile".to_string()
}

fn default_characteristics_url() -> String {
    "https://plantsservices.sc.egov.usda.gov/api/PlantCharacteristics".to_string()
}

fn default_concurrency() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_jitter() -> f64 {
    0.2
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            profile_url: default_profile_url(),
            characteristics_url: default_characteristics_url(),
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

impl FetchConfig {
    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff policy derived from the delay settings.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            base: Duration::from_millis(self.base_delay_ms),
            growth: 2.0,
            max: Duration::from_millis(self.max_delay_ms),
            jitter: self.jitter,
        }
    }

    /// Cross-field check not expressible as a field validator.
    pub fn check(&self) -> Result<()> {
        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::config(format!(
                "max_delay_ms ({}) must not be below base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        Ok(())
    }
}
