//! Triangular arbitrage calculation engine.
//!
//! Evaluates A→B→C→A cycles across three linked trading pairs by simulating
//! order execution against order-book depth, and searches for the investment
//! size that maximizes percentage return net of fees.
//!
//! # Pipeline
//!
//! ```text
//! CycleDriver::cycle        once per market-data tick
//!   └─ optimize             per relationship, sweeps investment sizes
//!        └─ calculate       per candidate, chains AB → BC → CA
//!             └─ calculate_leg
//!                  ├─ order_book_conversion / order_book_reverse_conversion
//!                  └─ calculate_dustless
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`orderbook`]: Depth snapshots and the book walker
//! - [`arbitrage`]: Conversions, leg/triangle calculations and the optimizer
//! - [`cycle`]: Cycle driver and statistics
//! - [`metrics`]: Latency and outcome metrics

pub mod arbitrage;
pub mod config;
pub mod cycle;
pub mod error;
pub mod metrics;
pub mod orderbook;

pub use config::{Config, ExecutionStrategy};
pub use cycle::{CycleDriver, CycleStatistics};
pub use error::{CalcError, EngineError, Result};
