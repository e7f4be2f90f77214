//! Investment size search for a single relationship.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{instrument, trace};

use super::calculator::calculate;
use super::types::{CalculatedResult, Relationship};
use crate::config::Config;
use crate::error::CalcError;
use crate::orderbook::DepthView;

/// Candidate investments from the configured minimum to maximum, inclusive.
#[derive(Debug, Clone)]
pub struct InvestmentSweep {
    next: Decimal,
    max: Decimal,
    step: Decimal,
}

impl InvestmentSweep {
    /// Sweep described by the configuration. Empty if the step is not positive.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.first_investment(), config.investment_max, config.investment_step)
    }

    /// Sweep from `start` to `max` in increments of `step`.
    pub fn new(start: Decimal, max: Decimal, step: Decimal) -> Self {
        Self {
            next: start,
            max,
            step,
        }
    }
}

impl Iterator for InvestmentSweep {
    type Item = Decimal;

    fn next(&mut self) -> Option<Decimal> {
        if self.step <= Decimal::ZERO || self.next > self.max {
            return None;
        }

        let current = self.next;
        self.next = current.checked_add(self.step).unwrap_or(Decimal::MAX);
        if self.next == current {
            self.step = Decimal::ZERO;
        }
        Some(current)
    }
}

/// Find the investment with the highest percent return.
///
/// Ties keep the earliest candidate. The first candidate that fails aborts
/// the sweep. Returns `None` when the sweep has no candidates.
#[instrument(skip_all, fields(relationship = %relationship.id()))]
pub fn optimize(
    relationship: &Arc<Relationship>,
    depth: &DepthView<'_>,
    config: &Config,
) -> Result<Option<CalculatedResult>, CalcError> {
    let mut best: Option<CalculatedResult> = None;

    for investment in InvestmentSweep::from_config(config) {
        let calculation = calculate(investment, relationship, depth, config)?;
        trace!(investment = %investment, percent = %calculation.percent, "Candidate evaluated");

        let improves = best
            .as_ref()
            .map_or(true, |current| calculation.percent > current.percent);
        if improves {
            best = Some(calculation);
        }
    }

    Ok(best)
}
