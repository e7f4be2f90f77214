//! Cycle statistics and bounded timing history.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::arbitrage::CalculatedResult;

/// Outcome of one pass over every relationship.
#[derive(Debug, Clone)]
pub struct CycleStatistics {
    /// Wall-clock time of the whole pass.
    pub calculation_time: Duration,
    /// Relationships that produced a result.
    pub success_count: usize,
    /// Relationships whose evaluation failed.
    pub error_count: usize,
    /// Best result per relationship id, when diagnostics are enabled.
    pub results: Option<HashMap<String, CalculatedResult>>,
}

/// Recent cycle durations plus running aggregates over every cycle recorded.
///
/// Memory is bounded by `capacity`; the aggregates use Welford's method so
/// they never need the evicted samples.
#[derive(Debug, Clone)]
pub struct TimingHistory {
    capacity: usize,
    recent: VecDeque<Duration>,
    count: u64,
    mean_ms: f64,
    m2: f64,
    min: Option<Duration>,
    max: Option<Duration>,
}

impl TimingHistory {
    /// Create a history keeping at most `capacity` recent samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
            count: 0,
            mean_ms: 0.0,
            m2: 0.0,
            min: None,
            max: None,
        }
    }

    /// Record one cycle duration.
    pub fn record(&mut self, elapsed: Duration) {
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(elapsed);

        self.count += 1;
        let sample = elapsed.as_secs_f64() * 1000.0;
        let delta = sample - self.mean_ms;
        self.mean_ms += delta / self.count as f64;
        self.m2 += delta * (sample - self.mean_ms);

        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
    }

    /// Samples ever recorded, including evicted ones.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Most recent samples, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &Duration> {
        self.recent.iter()
    }

    /// Number of samples currently retained.
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Latest sample.
    pub fn last(&self) -> Option<Duration> {
        self.recent.back().copied()
    }

    /// Mean over every recorded sample, in milliseconds.
    pub fn mean_ms(&self) -> f64 {
        self.mean_ms
    }

    /// Sample variance over every recorded sample, in milliseconds squared.
    pub fn variance_ms(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Sample standard deviation, in milliseconds.
    pub fn std_dev_ms(&self) -> f64 {
        self.variance_ms().sqrt()
    }

    /// Fastest cycle recorded.
    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    /// Slowest cycle recorded.
    pub fn max(&self) -> Option<Duration> {
        self.max
    }
}
