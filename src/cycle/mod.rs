//! Cycle module for driving calculations on each market-data tick.
//!
//! This module handles:
//! - Evaluating every relationship against one frozen depth cache
//! - Isolating failures per relationship
//! - Cycle statistics and bounded timing history

pub mod driver;
pub mod stats;

pub use driver::CycleDriver;
pub use stats::{CycleStatistics, TimingHistory};
