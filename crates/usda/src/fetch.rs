//! Rate-limited fetching with retry, backoff, and cancellation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use harvester_core::{CharacteristicEntry, Error, PlantProfile, RawRecord, Result, Symbol};

use crate::backoff::BackoffPolicy;
use crate::client::PlantsApi;
use crate::config::FetchConfig;

/// Boxed single-attempt future, the shape async-trait methods return.
type AttemptFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Terminal fetch outcome for one symbol.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Attempts consumed against the profile endpoint.
    pub attempts: u32,
    pub result: Result<RawRecord>,
}

/// Bounded-concurrency fetcher over any [`PlantsApi`] implementation.
///
/// At most `concurrency` permits are in flight across all symbols. A permit
/// is held for the whole attempt sequence of one endpoint call, backoff
/// sleeps included, so attempts for one symbol stay strictly sequential.
/// Permit waits, backoff sleeps, and in-flight attempts all race the
/// cancellation token.
pub struct Fetcher {
    api: Arc<dyn PlantsApi>,
    semaphore: Semaphore,
    backoff: BackoffPolicy,
    max_attempts: u32,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(api: Arc<dyn PlantsApi>, config: &FetchConfig, cancel: CancellationToken) -> Self {
        Self {
            api,
            semaphore: Semaphore::new(config.concurrency),
            backoff: config.backoff(),
            max_attempts: config.max_attempts,
            cancel,
        }
    }

    /// Fetch one symbol's raw record.
    ///
    /// The profile goes through the full retry policy and its terminal
    /// failure fails the symbol. The characteristics section is fetched
    /// best-effort afterwards when the profile advertises one.
    pub async fn fetch_record(&self, symbol: &Symbol) -> FetchOutcome {
        let (attempts, profile_result) = {
            let _permit = match self.acquire_permit().await {
                Ok(permit) => permit,
                Err(e) => {
                    return FetchOutcome {
                        attempts: 0,
                        result: Err(e),
                    }
                }
            };
            metrics().in_flight_requests.inc();
            let outcome = self
                .with_retry(symbol, "profile", || self.api.plant_profile(symbol))
                .await;
            metrics().in_flight_requests.dec();
            outcome
        };

        let profile = match profile_result {
            Ok(profile) => {
                metrics().profiles_fetched.inc();
                profile
            }
            Err(e) => {
                return FetchOutcome {
                    attempts,
                    result: Err(e),
                }
            }
        };

        let characteristics = self.characteristics_best_effort(symbol, &profile).await;

        FetchOutcome {
            attempts,
            result: Ok(RawRecord {
                profile,
                characteristics,
            }),
        }
    }

    /// Fetch the characteristics section when the profile advertises one.
    ///
    /// Terminal failures here degrade to an empty section; the symbol still
    /// succeeds. Cancellation during this phase degrades the same way, the
    /// profile already in hand is not discarded.
    async fn characteristics_best_effort(
        &self,
        symbol: &Symbol,
        profile: &PlantProfile,
    ) -> Vec<CharacteristicEntry> {
        if profile.has_characteristics != Some(true) {
            return Vec::new();
        }
        let plant_id = match profile.id {
            Some(id) => id,
            None => return Vec::new(),
        };

        let _permit = match self.acquire_permit().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!(symbol = %symbol, "Run cancelled, skipping characteristics");
                return Vec::new();
            }
        };
        metrics().in_flight_requests.inc();
        let (attempts, result) = self
            .with_retry(symbol, "characteristics", || {
                self.api.plant_characteristics(plant_id)
            })
            .await;
        metrics().in_flight_requests.dec();

        match result {
            Ok(entries) => {
                metrics().characteristics_fetched.inc();
                entries
            }
            Err(e) => {
                metrics().characteristics_degraded.inc();
                warn!(
                    symbol = %symbol,
                    plant_id = plant_id,
                    attempts = attempts,
                    error = %e,
                    "Characteristics fetch failed, continuing without"
                );
                Vec::new()
            }
        }
    }

    /// Run one endpoint call under the retry policy.
    ///
    /// Permanent errors return immediately without consuming retry budget.
    /// Transient errors burn attempts until `max_attempts`; the wait before
    /// each retry is the backoff delay, or the server's Retry-After seconds
    /// when the last error carried one.
    async fn with_retry<'a, T>(
        &'a self,
        symbol: &'a Symbol,
        endpoint: &'static str,
        call: impl Fn() -> AttemptFuture<'a, T>,
    ) -> (u32, Result<T>) {
        let mut rng = StdRng::from_entropy();
        let mut attempts: u32 = 0;
        let mut last_error: Option<Error> = None;

        while attempts < self.max_attempts {
            if attempts > 0 {
                let wait = match last_error.as_ref().and_then(Error::retry_after) {
                    Some(secs) => Duration::from_secs(secs),
                    None => self.backoff.delay(attempts, &mut rng),
                };
                warn!(
                    symbol = %symbol,
                    endpoint = endpoint,
                    next_attempt = attempts + 1,
                    wait_ms = %wait.as_millis(),
                    "Retrying after transient failure"
                );
                metrics().fetch_retries.inc();
                if self.wait_cancellable(wait).await.is_err() {
                    return (attempts, Err(Error::Cancelled));
                }
            }
            attempts += 1;
            metrics().fetch_attempts.inc();

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(Error::Cancelled),
                result = call() => result,
            };

            match result {
                Ok(value) => return (attempts, Ok(value)),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return (attempts, Err(e)),
            }
        }

        let error = last_error.unwrap_or_else(|| Error::transient("retry budget spent"));
        (attempts, Err(error))
    }

    /// Wait for a permit, racing cancellation. Cancellation wins when both
    /// are ready.
    async fn acquire_permit(&self) -> Result<SemaphorePermit<'_>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            permit = self.semaphore.acquire() => permit.map_err(|_| Error::Cancelled),
        }
    }

    async fn wait_cancellable(&self, wait: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }
}
