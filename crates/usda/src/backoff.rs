//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Retry delay policy: exponential growth, capped, plus uniform jitter.
///
/// The policy computes delays only; the attempt ceiling is enforced by the
/// fetcher.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    pub base: Duration,
    /// Multiplier applied per additional failed attempt
    pub growth: f64,
    /// Cap applied to the grown delay before jitter
    pub max: Duration,
    /// Jitter drawn from `U(0, jitter * capped_delay)`
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            growth: 2.0,
            max: Duration::from_secs(10),
            jitter: 0.2,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after `attempt` failed tries (`attempt >= 1`).
    ///
    /// `min(base * growth^(attempt - 1), max) + U(0, jitter * capped)`.
    /// Deterministic given a seeded RNG.
    pub fn delay(&self, attempt: u32, rng: &mut impl Rng) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let grown = self.base.as_secs_f64() * self.growth.powi(exponent);
        let capped = grown.min(self.max.as_secs_f64());

        let jitter_bound = self.jitter * capped;
        let jitter = if jitter_bound > 0.0 {
            rng.gen_range(0.0..jitter_bound)
        } else {
            0.0
        };

        Duration::from_secs_f64(capped + jitter)
    }

    /// Delay without the random component: `min(base * growth^(n-1), max)`.
    pub fn deterministic_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let grown = self.base.as_secs_f64() * self.growth.powi(exponent);
        Duration::from_secs_f64(grown.min(self.max.as_secs_f64()))
    }
}
