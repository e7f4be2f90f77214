//! Metrics for cycle latency and relationship outcomes.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Cycle calculation latency metric name.
pub const METRIC_CYCLE_LATENCY: &str = "cycle_calculation_latency_ms";
/// Per-relationship optimization latency metric name.
pub const METRIC_RELATIONSHIP_OPTIMIZE_LATENCY: &str = "relationship_optimize_latency_ms";
/// Cycles completed counter metric name.
pub const METRIC_CYCLES: &str = "cycles_total";
/// Relationships evaluated successfully counter metric name.
pub const METRIC_RELATIONSHIP_SUCCESSES: &str = "relationship_successes_total";
/// Relationships that failed evaluation counter metric name.
pub const METRIC_RELATIONSHIP_ERRORS: &str = "relationship_errors_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_CYCLE_LATENCY,
        "Time to evaluate every relationship once, in milliseconds"
    );
    describe_histogram!(
        METRIC_RELATIONSHIP_OPTIMIZE_LATENCY,
        "Time to sweep investment sizes for one relationship, in milliseconds"
    );

    describe_counter!(METRIC_CYCLES, "Total number of calculation cycles");
    describe_counter!(
        METRIC_RELATIONSHIP_SUCCESSES,
        "Total number of relationships evaluated successfully"
    );
    describe_counter!(
        METRIC_RELATIONSHIP_ERRORS,
        "Total number of relationship evaluations that failed"
    );

    debug!("Metrics initialized");
}

/// Record a completed cycle and its latency.
pub fn record_cycle(elapsed: Duration) {
    histogram!(METRIC_CYCLE_LATENCY).record(elapsed.as_secs_f64() * 1000.0);
    counter!(METRIC_CYCLES).increment(1);
}

/// Increment relationship success counter.
pub fn inc_relationship_successes() {
    counter!(METRIC_RELATIONSHIP_SUCCESSES).increment(1);
}

/// Increment relationship error counter, labelled by error kind.
pub fn inc_relationship_errors(kind: &'static str) {
    counter!(METRIC_RELATIONSHIP_ERRORS, "kind" => kind).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for one relationship's optimization.
pub fn timer_relationship_optimize() -> LatencyTimer {
    LatencyTimer::new(METRIC_RELATIONSHIP_OPTIMIZE_LATENCY)
}
