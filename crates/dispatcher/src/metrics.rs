//! Per-client dispatch metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for one client
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Requests currently awaiting a transport outcome
    in_flight: AtomicUsize,
    /// Requests handed to the transport
    dispatched: AtomicU64,
    /// Successful outcomes
    succeeded: AtomicU64,
    /// Transport failures
    failed: AtomicU64,
    /// Calls rejected before any network activity
    short_circuited: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn short_circuited(&self) -> u64 {
        self.short_circuited.load(Ordering::Relaxed)
    }

    /// Mark a request as handed to the transport
    pub fn start_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark an in-flight request as finished
    pub fn finish_dispatch(&self, success: bool) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_short_circuited(&self) {
        self.short_circuited.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            in_flight: self.in_flight(),
            dispatched: self.dispatched(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            short_circuited: self.short_circuited(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub in_flight: usize,
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub short_circuited: u64,
}
