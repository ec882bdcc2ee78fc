//! HTTP client for the USDA PLANTS service.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Instant;
use telemetry::metrics;
use tracing::debug;
use url::Url;

use harvester_core::{CharacteristicEntry, Error, PlantProfile, Result, Symbol};

use crate::config::FetchConfig;

/// Browser user agent; the service rejects default client agents.
const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Mobile Safari/537.36";

/// Statuses retried besides 429.
const RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Single-attempt access to the USDA PLANTS service.
///
/// One call is one request. Retry, backoff, and the concurrency bound live
/// in [`crate::fetch::Fetcher`], which keeps implementations of this trait
/// trivially mockable.
#[async_trait]
pub trait PlantsApi: Send + Sync {
    /// Fetch the profile for one symbol.
    async fn plant_profile(&self, symbol: &Symbol) -> Result<PlantProfile>;

    /// Fetch the characteristics array for one plant id.
    async fn plant_characteristics(&self, plant_id: i64) -> Result<Vec<CharacteristicEntry>>;
}

/// reqwest-backed client for the live service.
pub struct PlantsClient {
    http: reqwest::Client,
    profile_url: Url,
    characteristics_url: Url,
}

impl PlantsClient {
    /// Build a client from the fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            profile_url: parse_endpoint(&config.profile_url, "profile_url")?,
            characteristics_url: parse_endpoint(&config.characteristics_url, "characteristics_url")?,
        })
    }

    /// One GET, classified into the fetch error taxonomy.
    ///
    /// Transport errors and timeouts are transient; 429 is transient with
    /// the server's Retry-After attached; 500/502/503/504 are transient;
    /// any other non-success status, and an undecodable body, are permanent.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &'static str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transient(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            metrics().rate_limited_responses.inc();
            let retry_after = parse_retry_after(response.headers());
            return Err(Error::rate_limited(
                format!("{} rate limited (HTTP 429)", endpoint),
                retry_after,
            ));
        }
        if RETRYABLE_STATUSES.contains(&status.as_u16()) {
            return Err(Error::transient(format!(
                "{} returned HTTP {}",
                endpoint,
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(Error::permanent(
                status.as_u16(),
                format!("{} returned HTTP {}", endpoint, status.as_u16()),
            ));
        }

        // The client-level timeout covers the body read too, so a stall or
        // dropped connection after headers surfaces here wrapped in a
        // decode error. Only a genuinely unparseable body is permanent.
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                Error::transient(format!("{} body read failed: {}", endpoint, e))
            } else {
                Error::permanent(
                    status.as_u16(),
                    format!("{} body undecodable: {}", endpoint, e),
                )
            }
        })
    }
}

#[async_trait]
impl PlantsApi for PlantsClient {
    async fn plant_profile(&self, symbol: &Symbol) -> Result<PlantProfile> {
        let mut url = self.profile_url.clone();
        url.query_pairs_mut().append_pair("symbol", symbol.as_str());
        debug!(symbol = %symbol, "Requesting plant profile");

        let start = Instant::now();
        let profile: Option<PlantProfile> = self.get_json(url, "profile").await?;
        metrics().profile_latency_ms.observe_duration(start.elapsed());

        // The service answers unknown symbols with a literal null body.
        profile.ok_or_else(|| Error::permanent(200, format!("no profile for symbol {}", symbol)))
    }

    async fn plant_characteristics(&self, plant_id: i64) -> Result<Vec<CharacteristicEntry>> {
        let url = characteristics_url_for(&self.characteristics_url, plant_id)?;
        debug!(plant_id = plant_id, "Requesting plant characteristics");

        let start = Instant::now();
        let entries: Option<Vec<CharacteristicEntry>> =
            self.get_json(url, "characteristics").await?;
        metrics()
            .characteristics_latency_ms
            .observe_duration(start.elapsed());

        Ok(entries.unwrap_or_default())
    }
}

/// Parse and sanity-check a configured endpoint URL.
fn parse_endpoint(raw: &str, name: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("invalid {}: {}", name, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!(
            "invalid {}: cannot carry path segments",
            name
        )));
    }
    Ok(url)
}

/// Append the plant id as a path segment of the characteristics endpoint.
fn characteristics_url_for(base: &Url, plant_id: i64) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::config("characteristics_url cannot carry path segments"))?
        .pop_if_empty()
        .push(&plant_id.to_string());
    Ok(url)
}

/// Integer-seconds Retry-After, if the response carries a parseable one.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}
