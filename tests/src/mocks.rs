//! Mock implementations for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use harvester_core::{CharacteristicEntry, Error, PlantProfile, Result, Symbol};
use usda_client::PlantsApi;

/// One scripted reply from the profile endpoint.
#[derive(Debug, Clone)]
pub enum ProfileReply {
    /// 200 with a profile body.
    Found(PlantProfile),
    /// 200 with a literal `null` body (unknown symbol).
    Missing,
    /// The request timed out.
    Timeout,
    /// A retryable 5xx response.
    ServerError(u16),
    /// 429 with an optional Retry-After value in seconds.
    RateLimited(Option<u64>),
}

impl ProfileReply {
    fn to_result(&self, symbol: &Symbol) -> Result<PlantProfile> {
        match self {
            ProfileReply::Found(profile) => Ok(profile.clone()),
            ProfileReply::Missing => Err(Error::permanent(
                200,
                format!("no profile for symbol {}", symbol),
            )),
            ProfileReply::Timeout => Err(Error::transient("request timed out")),
            ProfileReply::ServerError(status) => {
                Err(Error::transient(format!("HTTP {} from profile", status)))
            }
            ProfileReply::RateLimited(retry_after) => {
                Err(Error::rate_limited("HTTP 429 from profile", *retry_after))
            }
        }
    }
}

/// One scripted reply from the characteristics endpoint.
#[derive(Debug, Clone)]
pub enum CharacteristicsReply {
    Entries(Vec<CharacteristicEntry>),
    Timeout,
    ServerError(u16),
}

impl CharacteristicsReply {
    fn to_result(&self) -> Result<Vec<CharacteristicEntry>> {
        match self {
            CharacteristicsReply::Entries(entries) => Ok(entries.clone()),
            CharacteristicsReply::Timeout => Err(Error::transient("request timed out")),
            CharacteristicsReply::ServerError(status) => Err(Error::transient(format!(
                "HTTP {} from characteristics",
                status
            ))),
        }
    }
}

/// Mock PLANTS service serving scripted replies per symbol.
///
/// Implements the same `PlantsApi` trait as the real `PlantsClient`, so
/// tests exercise every production path except the HTTP transport.
/// Replies are consumed in order; the last reply of a script repeats for
/// all further calls. Unscripted symbols answer like an unknown symbol.
#[derive(Clone, Default)]
pub struct MockPlantsApi {
    profiles: Arc<Mutex<HashMap<String, Vec<ProfileReply>>>>,
    profile_delays: Arc<Mutex<HashMap<String, Duration>>>,
    characteristics: Arc<Mutex<HashMap<i64, Vec<CharacteristicsReply>>>>,
    profile_calls: Arc<Mutex<HashMap<String, usize>>>,
    characteristics_calls: Arc<Mutex<HashMap<i64, usize>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockPlantsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the profile endpoint for a symbol.
    pub fn script_profile(&self, symbol: &str, replies: Vec<ProfileReply>) {
        self.profiles.lock().insert(symbol.to_string(), replies);
    }

    /// Script the characteristics endpoint for a plant id.
    pub fn script_characteristics(&self, plant_id: i64, replies: Vec<CharacteristicsReply>) {
        self.characteristics.lock().insert(plant_id, replies);
    }

    /// Hold every profile call for `symbol` open this long before replying.
    pub fn delay_profile(&self, symbol: &str, delay: Duration) {
        self.profile_delays
            .lock()
            .insert(symbol.to_string(), delay);
    }

    /// Profile attempts observed for a symbol.
    pub fn profile_calls(&self, symbol: &str) -> usize {
        self.profile_calls.lock().get(symbol).copied().unwrap_or(0)
    }

    /// Characteristics attempts observed for a plant id.
    pub fn characteristics_calls(&self, plant_id: i64) -> usize {
        self.characteristics_calls
            .lock()
            .get(&plant_id)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of simultaneously open calls observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> InFlightGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }
}

/// Decrements the in-flight count when the call ends, including when a
/// cancelled caller drops the call future mid-way.
struct InFlightGuard<'a>(&'a MockPlantsApi);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlantsApi for MockPlantsApi {
    async fn plant_profile(&self, symbol: &Symbol) -> Result<PlantProfile> {
        let index = {
            let mut calls = self.profile_calls.lock();
            let count = calls.entry(symbol.as_str().to_string()).or_insert(0);
            let index = *count;
            *count += 1;
            index
        };

        let _guard = self.begin_call();
        let delay = self.profile_delays.lock().get(symbol.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let profiles = self.profiles.lock();
            match profiles.get(symbol.as_str()) {
                Some(replies) if !replies.is_empty() => {
                    replies[index.min(replies.len() - 1)].clone()
                }
                _ => ProfileReply::Missing,
            }
        };
        reply.to_result(symbol)
    }

    async fn plant_characteristics(&self, plant_id: i64) -> Result<Vec<CharacteristicEntry>> {
        let index = {
            let mut calls = self.characteristics_calls.lock();
            let count = calls.entry(plant_id).or_insert(0);
            let index = *count;
            *count += 1;
            index
        };

        let _guard = self.begin_call();
        let reply = {
            let characteristics = self.characteristics.lock();
            match characteristics.get(&plant_id) {
                Some(replies) if !replies.is_empty() => {
                    replies[index.min(replies.len() - 1)].clone()
                }
                _ => CharacteristicsReply::Entries(Vec::new()),
            }
        };
        reply.to_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_script_replays_then_repeats_last() {
        let mock = MockPlantsApi::new();
        mock.script_profile(
            "ABCD",
            vec![
                ProfileReply::Timeout,
                ProfileReply::Found(PlantProfile {
                    id: Some(1),
                    symbol: Some("ABCD".to_string()),
                    ..PlantProfile::default()
                }),
            ],
        );

        let sym = symbol("ABCD");
        assert!(mock.plant_profile(&sym).await.is_err());
        assert!(mock.plant_profile(&sym).await.is_ok());
        assert!(mock.plant_profile(&sym).await.is_ok());
        assert_eq!(mock.profile_calls("ABCD"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_symbol_reports_missing() {
        let mock = MockPlantsApi::new();
        let error = mock.plant_profile(&symbol("XXXX")).await.unwrap_err();
        assert!(matches!(error, Error::Permanent { status: 200, .. }));
        assert!(error.to_string().contains("no profile"));
    }

    #[tokio::test]
    async fn test_unscripted_characteristics_are_empty() {
        let mock = MockPlantsApi::new();
        let entries = mock.plant_characteristics(99).await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(mock.characteristics_calls(99), 1);
    }
}
