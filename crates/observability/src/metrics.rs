//! Dispatch metrics
//!
//! Prometheus counters/histograms for event dispatch, plus an in-memory
//! aggregator for end-of-run summaries.

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// Record one completed dispatch
///
/// `kind` is `"single"` or `"batch"`, `transport` the transport name.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatch;
///
/// record_dispatch("single", "fetch", true);
/// ```
pub fn record_dispatch(kind: &str, transport: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "eventwire_dispatches_total",
        "kind" => kind.to_string(),
        "transport" => transport.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a failure classified by error kind (e.g. "http_status", "timeout")
pub fn record_dispatch_failure(kind: &str, error_kind: &str) {
    counter!(
        "eventwire_dispatch_failures_total",
        "kind" => kind.to_string(),
        "error" => error_kind.to_string()
    )
    .increment(1);
}

/// Record a dispatch rejected before any network activity
pub fn record_short_circuit(reason: &str) {
    counter!(
        "eventwire_short_circuits_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record transport round-trip latency
pub fn record_dispatch_latency_ms(transport: &str, latency_ms: f64) {
    histogram!(
        "eventwire_dispatch_latency_ms",
        "transport" => transport.to_string()
    )
    .record(latency_ms);
}

/// Record the size of a batch about to be sent
pub fn record_batch_size(collections: usize, events: usize) {
    histogram!("eventwire_batch_collections").record(collections as f64);
    histogram!("eventwire_batch_events").record(events as f64);
}

/// Record the kill-switch state
pub fn record_gate_state(enabled: bool) {
    gauge!("eventwire_enabled").set(if enabled { 1.0 } else { 0.0 });
}

/// Dispatch statistics aggregator
///
/// Aggregates outcomes in memory for summaries.
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// Total dispatches
    pub total: u64,

    /// Successful dispatches
    pub succeeded: u64,

    /// Failed dispatches (including short-circuits)
    pub failed: u64,

    /// Failures that never reached the network
    pub short_circuited: u64,

    /// Latency statistics for dispatches that reached a transport
    pub latency_stats: RunningStats,

    /// Failure counts per error kind
    pub failure_kinds: HashMap<String, u64>,
}

impl DispatchStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success with its latency
    pub fn record_success(&mut self, latency_ms: f64) {
        self.total += 1;
        self.succeeded += 1;
        self.latency_stats.push(latency_ms);
    }

    /// Record a failure
    ///
    /// `latency_ms` is `None` for short-circuited calls.
    pub fn record_failure(&mut self, error_kind: &str, latency_ms: Option<f64>) {
        self.total += 1;
        self.failed += 1;
        *self.failure_kinds.entry(error_kind.to_string()).or_insert(0) += 1;

        match latency_ms {
            Some(ms) => self.latency_stats.push(ms),
            None => self.short_circuited += 1,
        }
    }

    /// Generate summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            short_circuited: self.short_circuited,
            failure_rate: if self.total > 0 {
                self.failed as f64 / self.total as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            failure_kinds: self.failure_kinds.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub short_circuited: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub failure_kinds: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total dispatches: {}", self.total)?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(f, "Failed: {} ({:.2}%)", self.failed, self.failure_rate)?;
        writeln!(f, "Short-circuited: {}", self.short_circuited)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.failure_kinds.is_empty() {
            writeln!(f, "Failures by kind:")?;
            for (kind, count) in &self.failure_kinds {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
