//! Per-tick evaluation of every candidate relationship.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::stats::{CycleStatistics, TimingHistory};
use crate::arbitrage::{optimize, CalculatedResult, Relationship};
use crate::config::Config;
use crate::error::CalcError;
use crate::metrics;
use crate::orderbook::{DepthCache, DepthView};

/// Runs calculation cycles and keeps counters across them.
///
/// A driver is meant to be owned by whatever reacts to market-data updates.
/// Only one cycle runs at a time, which `&mut self` enforces.
#[derive(Debug)]
pub struct CycleDriver {
    config: Config,
    cycle_count: u64,
    timings: TimingHistory,
}

impl CycleDriver {
    /// Create a driver for the given configuration.
    pub fn new(config: Config) -> Self {
        let timings = TimingHistory::new(config.timing_history_capacity);
        Self {
            config,
            cycle_count: 0,
            timings,
        }
    }

    /// Configuration this driver evaluates with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of cycles completed.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Timing history of completed cycles.
    pub fn timings(&self) -> &TimingHistory {
        &self.timings
    }

    /// Evaluate every relationship once against a frozen depth cache.
    ///
    /// `on_result` receives the best result of each relationship that
    /// evaluates. `on_error` receives each failure as a structured
    /// [`CalcError`]; its `Display` output is the human-readable message and
    /// [`CalcError::ticker`] names the instrument. A failing relationship
    /// never stops the others from being evaluated.
    #[instrument(skip_all, fields(relationships = relationships.len(), cycle = self.cycle_count + 1))]
    pub fn cycle<E, R>(
        &mut self,
        relationships: &[Arc<Relationship>],
        depth_cache: &DepthCache,
        mut on_error: E,
        mut on_result: R,
    ) -> CycleStatistics
    where
        E: FnMut(&CalcError),
        R: FnMut(CalculatedResult),
    {
        let start = Instant::now();

        let mut success_count = 0;
        let mut error_count = 0;
        let mut results = self.config.diagnostics_enabled.then(HashMap::new);

        for relationship in relationships {
            match self.evaluate(relationship, depth_cache) {
                Ok(Some(calculated)) => {
                    success_count += 1;
                    metrics::inc_relationship_successes();
                    debug!(
                        relationship = %calculated.id,
                        investment = %calculated.investment,
                        percent = %calculated.percent,
                        "Relationship evaluated"
                    );

                    if let Some(results) = results.as_mut() {
                        results.insert(calculated.id.clone(), calculated.clone());
                    }
                    on_result(calculated);
                }
                Ok(None) => {}
                Err(err) => {
                    error_count += 1;
                    metrics::inc_relationship_errors(error_kind(&err));
                    warn!(
                        relationship = %relationship.id(),
                        ticker = err.ticker(),
                        error = %err,
                        "Relationship evaluation failed"
                    );
                    on_error(&err);
                }
            }
        }

        let calculation_time = start.elapsed();
        self.timings.record(calculation_time);
        self.cycle_count += 1;
        metrics::record_cycle(calculation_time);

        debug!(
            calculation_time_ms = calculation_time.as_secs_f64() * 1000.0,
            success_count, error_count, "Cycle complete"
        );

        CycleStatistics {
            calculation_time,
            success_count,
            error_count,
            results,
        }
    }

    fn evaluate(
        &self,
        relationship: &Arc<Relationship>,
        depth_cache: &DepthCache,
    ) -> Result<Option<CalculatedResult>, CalcError> {
        let _timer = metrics::timer_relationship_optimize();
        let depth = DepthView::assemble(relationship, depth_cache)?;
        optimize(relationship, &depth, &self.config)
    }
}

fn error_kind(err: &CalcError) -> &'static str {
    match err {
        CalcError::CrossedBook { .. } => "crossed_book",
        CalcError::InsufficientDepth { .. } => "insufficient_depth",
        CalcError::Overflow { .. } => "overflow",
        CalcError::MissingDepth { .. } => "missing_depth",
    }
}
