//! Internal metrics collection.
//!
//! Metrics accumulate in-process over one run; the binary logs a snapshot
//! when the run finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for request latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 15s, 60s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [10, 25, 50, 100, 250, 500, 1000, 2500, 5000, 15000, 60000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    /// Records an elapsed duration.
    pub fn observe_duration(&self, elapsed: Duration) {
        self.observe(elapsed.as_millis() as u64);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for one harvest run.
#[derive(Debug, Default)]
pub struct Metrics {
    // Fetch metrics
    pub profiles_fetched: Counter,
    pub characteristics_fetched: Counter,
    pub fetch_attempts: Counter,
    pub fetch_retries: Counter,
    pub rate_limited_responses: Counter,
    pub characteristics_degraded: Counter,

    // Per-symbol outcomes, failures also counted by terminal kind
    pub symbols_succeeded: Counter,
    pub symbols_failed: Counter,
    pub failures_retries_exhausted: Counter,
    pub failures_permanent: Counter,
    pub failures_normalization: Counter,
    pub failures_cancelled: Counter,

    // Output metrics
    pub rows_emitted: Counter,

    // Latency histograms
    pub profile_latency_ms: Histogram,
    pub characteristics_latency_ms: Histogram,

    // Gauges
    pub in_flight_requests: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub profiles_fetched: u64,
    pub characteristics_fetched: u64,
    pub fetch_attempts: u64,
    pub fetch_retries: u64,
    pub rate_limited_responses: u64,
    pub characteristics_degraded: u64,
    pub symbols_succeeded: u64,
    pub symbols_failed: u64,
    pub failures_retries_exhausted: u64,
    pub failures_permanent: u64,
    pub failures_normalization: u64,
    pub failures_cancelled: u64,
    pub rows_emitted: u64,
    pub profile_latency_mean_ms: f64,
    pub characteristics_latency_mean_ms: f64,
    pub in_flight_requests: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            profiles_fetched: self.profiles_fetched.get(),
            characteristics_fetched: self.characteristics_fetched.get(),
            fetch_attempts: self.fetch_attempts.get(),
            fetch_retries: self.fetch_retries.get(),
            rate_limited_responses: self.rate_limited_responses.get(),
            characteristics_degraded: self.characteristics_degraded.get(),
            symbols_succeeded: self.symbols_succeeded.get(),
            symbols_failed: self.symbols_failed.get(),
            failures_retries_exhausted: self.failures_retries_exhausted.get(),
            failures_permanent: self.failures_permanent.get(),
            failures_normalization: self.failures_normalization.get(),
            failures_cancelled: self.failures_cancelled.get(),
            rows_emitted: self.rows_emitted.get(),
            profile_latency_mean_ms: self.profile_latency_ms.mean(),
            characteristics_latency_mean_ms: self.characteristics_latency_ms.mean(),
            in_flight_requests: self.in_flight_requests.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
