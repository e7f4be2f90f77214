//! Unified error types for the calculation engine.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::arbitrage::ConversionDirection;

/// Unified error type for the engine and its binary.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised while evaluating one relationship against a depth snapshot.
///
/// Every variant is local to a single relationship for a single cycle. The
/// cycle driver reports them and moves on to the next relationship.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// Best bid is not strictly below best ask.
    #[error("spread does not exist for {ticker}: best_bid={best_bid} >= best_ask={best_ask}")]
    CrossedBook {
        /// Instrument whose book is crossed.
        ticker: String,
        /// Best bid price.
        best_bid: Decimal,
        /// Best ask price.
        best_ask: Decimal,
    },

    /// The walked side ran out of levels before the amount was converted.
    #[error(
        "bid depth ({bid_levels}) or ask depth ({ask_levels}) too shallow to {direction} {remaining} {from} to {to} using {ticker}"
    )]
    InsufficientDepth {
        /// Instrument being walked.
        ticker: String,
        /// Source currency.
        from: String,
        /// Destination currency.
        to: String,
        /// Source amount left unconverted.
        remaining: Decimal,
        /// Number of bid levels in the snapshot.
        bid_levels: usize,
        /// Number of ask levels in the snapshot.
        ask_levels: usize,
        /// Forward or reverse conversion.
        direction: ConversionDirection,
    },

    /// An amount walked through the book does not fit in a `Decimal`.
    #[error("amount overflowed while walking {ticker}")]
    Overflow {
        /// Instrument being walked.
        ticker: String,
    },

    /// The depth cache holds no book for a leg's instrument.
    #[error("no depth snapshot for {ticker}")]
    MissingDepth {
        /// Instrument that was looked up.
        ticker: String,
    },
}

impl CalcError {
    /// Instrument the failure refers to.
    pub fn ticker(&self) -> &str {
        match self {
            CalcError::CrossedBook { ticker, .. }
            | CalcError::InsufficientDepth { ticker, .. }
            | CalcError::Overflow { ticker }
            | CalcError::MissingDepth { ticker } => ticker,
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
