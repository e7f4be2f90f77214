//! Arbitrage module for evaluating triangular relationships.
//!
//! This module handles:
//! - Relationship and result types
//! - Dust rounding to instrument precision
//! - Order book conversion, forward and reverse
//! - Leg and triangle profit calculations
//! - Investment size optimization

pub mod calculator;
pub mod conversion;
pub mod dust;
pub mod optimizer;
pub mod types;

pub use calculator::{calculate, calculate_leg, recalculate_trade_leg, LegOutcome};
pub use conversion::{order_book_conversion, order_book_reverse_conversion, ConversionLeg, Converted};
pub use dust::calculate_dustless;
pub use optimizer::{optimize, InvestmentSweep};
pub use types::{
    CalculatedResult, ConversionDirection, CurrencyFlow, Method, Phase, Relationship, Symbols,
    TradeLeg,
};
