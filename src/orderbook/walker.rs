//! Book walking shared by forward and reverse conversion.
//!
//! Every conversion consumes one side of a depth snapshot from the best level
//! outward. The variations between conversions are captured by [`BookWalk`]:
//! which side is walked, how each level's price is transformed, and whether
//! the source amount is measured in level size or in notional.

use rust_decimal::Decimal;

use super::types::{DepthSnapshot, PriceLevel};

/// Weight of the best ask in the trigger blend.
pub const TRIGGER_ASK_WEIGHT: Decimal = Decimal::ONE;
/// Weight of the current bid level in the trigger blend.
pub const TRIGGER_BID_WEIGHT: Decimal = Decimal::from_parts(9, 0, 0, false, 0);

/// Which side of the book is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkSide {
    /// Walk bids, best (highest) first.
    Bids,
    /// Walk asks, best (lowest) first.
    Asks,
}

/// Per-level price used while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTransform {
    /// Use the level's own price.
    Identity,
    /// Blend the level's price with the best ask, modelling a resting limit order.
    TriggerBlend {
        /// Best ask at the time of the walk.
        best_ask: Decimal,
    },
}

impl RateTransform {
    fn apply(&self, price: Decimal) -> Option<Decimal> {
        match *self {
            RateTransform::Identity => Some(price),
            RateTransform::TriggerBlend { best_ask } => {
                weighted_rate(TRIGGER_ASK_WEIGHT, TRIGGER_BID_WEIGHT, best_ask, price)
            }
        }
    }
}

/// How the remaining source amount is compared against each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Source is in base currency: compare against level size, accumulate `size * rate`.
    Quantity,
    /// Source is in quote currency: compare against `size * rate`, accumulate size.
    Notional,
}

/// A fully specified walk over one side of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookWalk {
    /// Side to consume.
    pub side: WalkSide,
    /// Price transform applied to every level.
    pub rate: RateTransform,
    /// Termination rule.
    pub termination: Termination,
}

/// Result of a completed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Amount of the destination currency obtained.
    pub amount: Decimal,
    /// Effective rate of the last level touched.
    pub last_rate: Decimal,
    /// Number of levels touched, including the final partial one.
    pub levels_touched: usize,
}

/// Why a walk could not produce an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    /// The walked side ran out before the source amount was converted.
    Exhausted {
        /// Source amount left unconverted.
        remaining: Decimal,
    },
    /// An intermediate amount does not fit in a `Decimal`.
    Overflow,
}

/// Blend an ask and a bid price by weight.
///
/// ```text
///             bid_weight  ask_weight
///         |---------------|--------|
/// ask --------------------------------- bid
/// ```
///
/// Returns `None` when the blend overflows or both weights sum to zero.
pub fn weighted_rate(ask_weight: Decimal, bid_weight: Decimal, ask: Decimal, bid: Decimal) -> Option<Decimal> {
    let weighted = bid_weight
        .checked_mul(bid)?
        .checked_add(ask_weight.checked_mul(ask)?)?;
    weighted.checked_div(ask_weight.checked_add(bid_weight)?)
}

/// Convert `amount` by consuming levels of `snapshot` as described by `walk`.
///
/// Levels with a non-positive price carry no liquidity and are skipped. A
/// level whose notional exceeds `Decimal::MAX` covers any remaining amount.
pub fn walk_book(snapshot: &DepthSnapshot, walk: BookWalk, amount: Decimal) -> Result<WalkOutcome, WalkError> {
    let levels: &[PriceLevel] = match walk.side {
        WalkSide::Bids => &snapshot.bids,
        WalkSide::Asks => &snapshot.asks,
    };

    let mut remaining = amount;
    let mut converted = Decimal::ZERO;

    for (index, level) in levels.iter().enumerate() {
        let rate = walk.rate.apply(level.price).ok_or(WalkError::Overflow)?;
        if rate <= Decimal::ZERO {
            continue;
        }

        let outcome = |amount| WalkOutcome {
            amount,
            last_rate: rate,
            levels_touched: index + 1,
        };

        match walk.termination {
            Termination::Quantity => {
                if level.size < remaining {
                    remaining -= level.size;
                    converted = level
                        .size
                        .checked_mul(rate)
                        .and_then(|value| converted.checked_add(value))
                        .ok_or(WalkError::Overflow)?;
                } else {
                    // Last fill
                    let amount = remaining
                        .checked_mul(rate)
                        .and_then(|value| converted.checked_add(value))
                        .ok_or(WalkError::Overflow)?;
                    return Ok(outcome(amount));
                }
            }
            Termination::Notional => match level.size.checked_mul(rate) {
                Some(notional) if notional < remaining => {
                    remaining -= notional;
                    converted = converted.checked_add(level.size).ok_or(WalkError::Overflow)?;
                }
                _ => {
                    // Last fill
                    let amount = remaining
                        .checked_div(rate)
                        .and_then(|value| converted.checked_add(value))
                        .ok_or(WalkError::Overflow)?;
                    return Ok(outcome(amount));
                }
            },
        }
    }

    Err(WalkError::Exhausted { remaining })
}
