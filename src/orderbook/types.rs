//! Depth snapshot types and data structures.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arbitrage::Relationship;
use crate::error::CalcError;

/// Single price level in an order book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price at this level.
    pub price: Decimal,
    /// Total size available at this price, in the instrument's base currency.
    pub size: Decimal,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// Point-in-time depth for one instrument.
///
/// Bids are sorted by price descending, asks by price ascending, so the first
/// level of each side is the best price.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepthSnapshot {
    /// Bid levels sorted by price descending.
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    /// Ask levels sorted by price ascending.
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

impl DepthSnapshot {
    /// Create a snapshot from already-ordered sides.
    pub fn new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }

    /// Order bids best-first (descending) and asks best-first (ascending).
    pub fn sort_levels(&mut self) {
        self.bids.sort_by(|a, b| b.price.cmp(&a.price));
        self.asks.sort_by(|a, b| a.price.cmp(&b.price));
    }

    /// Get the best bid price.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Get the best ask price.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Get the spread between best bid and ask.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Check if the book is crossed (best_bid >= best_ask).
    ///
    /// A one-sided book is not considered crossed.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Fail with [`CalcError::CrossedBook`] if the book is crossed.
    pub fn ensure_spread(&self, ticker: &str) -> Result<(), CalcError> {
        if !self.is_crossed() {
            return Ok(());
        }

        Err(CalcError::CrossedBook {
            ticker: ticker.to_string(),
            best_bid: self.best_bid().unwrap_or_default(),
            best_ask: self.best_ask().unwrap_or_default(),
        })
    }
}

/// Frozen depth for every instrument, keyed by ticker.
pub type DepthCache = HashMap<String, DepthSnapshot>;

/// The three books one relationship needs, borrowed from a [`DepthCache`].
#[derive(Debug, Clone, Copy)]
pub struct DepthView<'a> {
    /// Book for the AB leg.
    pub ab: &'a DepthSnapshot,
    /// Book for the BC leg.
    pub bc: &'a DepthSnapshot,
    /// Book for the CA leg.
    pub ca: &'a DepthSnapshot,
}

impl<'a> DepthView<'a> {
    /// Look up each leg's instrument in the cache.
    pub fn assemble(relationship: &Relationship, cache: &'a DepthCache) -> Result<Self, CalcError> {
        let lookup = |ticker: &str| {
            cache.get(ticker).ok_or_else(|| CalcError::MissingDepth {
                ticker: ticker.to_string(),
            })
        };

        Ok(Self {
            ab: lookup(&relationship.ab.ticker)?,
            bc: lookup(&relationship.bc.ticker)?,
            ca: lookup(&relationship.ca.ticker)?,
        })
    }
}
