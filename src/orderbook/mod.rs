//! Order book module for depth snapshots.
//!
//! This module handles:
//! - Depth snapshot types and the per-cycle depth cache
//! - The book-walking primitive shared by every conversion

pub mod types;
pub mod walker;

pub use types::{DepthCache, DepthSnapshot, DepthView, PriceLevel};
pub use walker::{
    walk_book, weighted_rate, BookWalk, RateTransform, Termination, WalkError, WalkOutcome,
    WalkSide,
};
