//! Currency conversion by walking depth snapshots.
//!
//! An instrument's ticker is its base currency followed by its quote currency.
//! Converting base into quote sells into the bids; converting quote into base
//! buys from the asks. Reverse conversion answers the opposite question for a
//! quantity that has already been fixed: what it costs on the same side of the
//! book that produced it.

use rust_decimal::Decimal;

use super::types::{ConversionDirection, Phase};
use crate::config::ExecutionStrategy;
use crate::error::CalcError;
use crate::orderbook::{
    walk_book, BookWalk, DepthSnapshot, RateTransform, Termination, WalkError, WalkSide,
};

/// One conversion through one instrument.
#[derive(Debug, Clone, Copy)]
pub struct ConversionLeg<'a> {
    /// Instrument to walk.
    pub ticker: &'a str,
    /// Source currency.
    pub from: &'a str,
    /// Destination currency.
    pub to: &'a str,
    /// Frozen depth for `ticker`.
    pub depth: &'a DepthSnapshot,
    /// Position of the leg in the triangle.
    pub phase: Phase,
}

impl ConversionLeg<'_> {
    /// Whether the ticker quotes `from` in units of `to`.
    fn is_natural(&self) -> bool {
        self.ticker.len() == self.from.len() + self.to.len()
            && self.ticker.starts_with(self.from)
            && self.ticker.ends_with(self.to)
    }
}

/// Amount produced by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converted {
    /// Amount of the destination currency.
    pub amount: Decimal,
    /// Blended price of the last level, when the trigger strategy priced the walk.
    pub trigger_price: Option<Decimal>,
}

impl Converted {
    fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            trigger_price: None,
        }
    }
}

/// Convert `amount` of `leg.from` into `leg.to` against the book.
pub fn order_book_conversion(
    amount: Decimal,
    leg: &ConversionLeg<'_>,
    strategy: ExecutionStrategy,
) -> Result<Converted, CalcError> {
    convert(amount, leg, strategy, ConversionDirection::Forward)
}

/// Cost in `leg.to` of acquiring exactly `amount` of `leg.from`.
///
/// Used after a Buy leg's quantity has been dust-rounded so the amount paid
/// matches the quantity actually obtained.
pub fn order_book_reverse_conversion(
    amount: Decimal,
    leg: &ConversionLeg<'_>,
    strategy: ExecutionStrategy,
) -> Result<Converted, CalcError> {
    convert(amount, leg, strategy, ConversionDirection::Reverse)
}

fn convert(
    amount: Decimal,
    leg: &ConversionLeg<'_>,
    strategy: ExecutionStrategy,
    direction: ConversionDirection,
) -> Result<Converted, CalcError> {
    if amount.is_zero() {
        return Ok(Converted::zero());
    }

    leg.depth.ensure_spread(leg.ticker)?;

    let walk = plan_walk(leg, strategy, direction);
    let outcome = walk_book(leg.depth, walk, amount).map_err(|err| match err {
        WalkError::Exhausted { remaining } => CalcError::InsufficientDepth {
            ticker: leg.ticker.to_string(),
            from: leg.from.to_string(),
            to: leg.to.to_string(),
            remaining,
            bid_levels: leg.depth.bids.len(),
            ask_levels: leg.depth.asks.len(),
            direction,
        },
        WalkError::Overflow => CalcError::Overflow {
            ticker: leg.ticker.to_string(),
        },
    })?;

    let trigger_price = match walk.rate {
        RateTransform::TriggerBlend { .. } => Some(outcome.last_rate),
        RateTransform::Identity => None,
    };

    Ok(Converted {
        amount: outcome.amount,
        trigger_price,
    })
}

/// Choose side, pricing and termination for a conversion.
///
/// | direction | natural | walk                       |
/// |-----------|---------|----------------------------|
/// | forward   | yes     | bids, by quantity          |
/// | forward   | no      | asks (or trigger), notional|
/// | reverse   | yes     | asks (or trigger), quantity|
/// | reverse   | no      | bids, notional             |
fn plan_walk(leg: &ConversionLeg<'_>, strategy: ExecutionStrategy, direction: ConversionDirection) -> BookWalk {
    let natural = leg.is_natural();
    let termination = if natural {
        Termination::Quantity
    } else {
        Termination::Notional
    };
    let buys_from_asks = match direction {
        ConversionDirection::Forward => !natural,
        ConversionDirection::Reverse => natural,
    };

    if !buys_from_asks {
        return BookWalk {
            side: WalkSide::Bids,
            rate: RateTransform::Identity,
            termination,
        };
    }

    let trigger = strategy == ExecutionStrategy::Trigger && leg.phase == Phase::Ab;
    match (trigger, leg.depth.best_ask()) {
        (true, Some(best_ask)) => BookWalk {
            side: WalkSide::Bids,
            rate: RateTransform::TriggerBlend { best_ask },
            termination,
        },
        _ => BookWalk {
            side: WalkSide::Asks,
            rate: RateTransform::Identity,
            termination,
        },
    }
}
