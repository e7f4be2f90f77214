//! Relationship and result types for triangular evaluation.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Side of a leg's trade on its instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    /// Acquire the instrument's base currency by spending its quote currency.
    #[serde(alias = "BUY", alias = "buy")]
    Buy,
    /// Dispose of the instrument's base currency for its quote currency.
    #[serde(alias = "SELL", alias = "sell")]
    Sell,
}

/// Position of a leg within the triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Phase {
    /// A to B.
    #[strum(serialize = "AB")]
    Ab,
    /// B to C.
    #[strum(serialize = "BC")]
    Bc,
    /// C to A.
    #[strum(serialize = "CA")]
    Ca,
}

/// Whether a conversion prices an amount forward or recomputes its cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConversionDirection {
    /// Source amount to destination amount.
    #[strum(serialize = "convert")]
    Forward,
    /// Destination quantity back to its source cost.
    #[strum(serialize = "reverse convert")]
    Reverse,
}

/// The three currencies of a triangle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbols {
    /// Starting and ending currency.
    pub a: String,
    /// Intermediate currency after the first leg.
    pub b: String,
    /// Intermediate currency after the second leg.
    pub c: String,
}

impl Symbols {
    /// Create a symbol triple.
    pub fn new(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            c: c.into(),
        }
    }
}

/// One trade of the triangle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLeg {
    /// Exchange instrument, base currency followed by quote currency.
    pub ticker: String,
    /// Buy or sell the instrument's base currency.
    pub method: Method,
    /// Decimal places allowed for order quantities on this instrument.
    pub dust_decimals: u32,
}

impl TradeLeg {
    /// Create a trade leg.
    pub fn new(ticker: impl Into<String>, method: Method, dust_decimals: u32) -> Self {
        Self {
            ticker: ticker.into(),
            method,
            dust_decimals,
        }
    }
}

/// A candidate triangle A→B→C→A and the instruments that connect it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Currencies A, B and C.
    pub symbol: Symbols,
    /// Leg trading A for B.
    pub ab: TradeLeg,
    /// Leg trading B for C.
    pub bc: TradeLeg,
    /// Leg trading C for A.
    pub ca: TradeLeg,
}

impl Relationship {
    /// Identifier of results for this relationship.
    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.symbol.a, self.symbol.b, self.symbol.c)
    }

    /// Leg, source and destination currency for a phase.
    pub fn leg(&self, phase: Phase) -> (&TradeLeg, &str, &str) {
        let s = &self.symbol;
        match phase {
            Phase::Ab => (&self.ab, &s.a, &s.b),
            Phase::Bc => (&self.bc, &s.b, &s.c),
            Phase::Ca => (&self.ca, &s.c, &s.a),
        }
    }
}

/// Amounts of one currency flowing through the triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyFlow {
    /// Amount paid away.
    pub spent: Decimal,
    /// Amount received.
    pub earned: Decimal,
    /// `earned - spent`.
    pub delta: Decimal,
}

impl CurrencyFlow {
    fn settle(&mut self) {
        self.delta = self.earned - self.spent;
    }
}

/// Evaluation of one relationship at one investment size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedResult {
    /// Concatenated currency codes, e.g. `BTC-ETH-BNB`.
    pub id: String,
    /// Relationship that was evaluated.
    #[serde(skip)]
    pub relationship: Arc<Relationship>,
    /// Candidate investment of currency A.
    pub investment: Decimal,
    /// Quantity traded on the AB instrument.
    pub ab: Decimal,
    /// Quantity traded on the BC instrument.
    pub bc: Decimal,
    /// Quantity traded on the CA instrument.
    pub ca: Decimal,
    /// Flow of currency A.
    pub a: CurrencyFlow,
    /// Flow of currency B.
    pub b: CurrencyFlow,
    /// Flow of currency C.
    pub c: CurrencyFlow,
    /// Net return on `a.spent` in percent, after fees.
    pub percent: Decimal,
    /// Limit price for the AB leg when the trigger strategy priced it.
    pub ab_limit_buy_price: Option<Decimal>,
}

impl CalculatedResult {
    /// Empty result for a relationship, to be filled leg by leg.
    pub(crate) fn new(relationship: &Arc<Relationship>, investment: Decimal) -> Self {
        Self {
            id: relationship.id(),
            relationship: Arc::clone(relationship),
            investment,
            ab: Decimal::ZERO,
            bc: Decimal::ZERO,
            ca: Decimal::ZERO,
            a: CurrencyFlow::default(),
            b: CurrencyFlow::default(),
            c: CurrencyFlow::default(),
            percent: Decimal::ZERO,
            ab_limit_buy_price: None,
        }
    }

    /// Compute deltas for every currency.
    pub(crate) fn settle(&mut self) {
        self.a.settle();
        self.b.settle();
        self.c.settle();
    }

    /// Whether the triangle returns more A than it spends after fees.
    pub fn is_profitable(&self) -> bool {
        self.percent > Decimal::ZERO
    }
}
