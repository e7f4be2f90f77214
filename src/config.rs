//! Engine configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;
use strum::Display;

use crate::error::{EngineError, Result};

/// How the AB leg is priced when it walks the ask side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Deserialize, Default)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// Sweep resting asks level by level.
    #[default]
    #[serde(alias = "Sweep", alias = "SWEEP")]
    Sweep,
    /// Price the AB leg as a passive limit order between bid and best ask.
    #[serde(alias = "Trigger", alias = "TRIGGER")]
    Trigger,
}

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Investment Sweep ===
    /// First candidate investment, in units of currency A. Falls back to the step.
    #[serde(default)]
    pub investment_min: Option<Decimal>,

    /// Last candidate investment (inclusive).
    #[serde(default = "default_investment_max")]
    pub investment_max: Decimal,

    /// Increment between candidate investments.
    #[serde(default = "default_investment_step")]
    pub investment_step: Decimal,

    // === Trading Parameters ===
    /// Taker fee charged per leg, in percent (0.1 = 0.1%).
    #[serde(default = "default_taker_fee")]
    pub taker_fee: Decimal,

    /// Execution strategy: "sweep" or "trigger".
    #[serde(default)]
    pub execution_strategy: ExecutionStrategy,

    // === Diagnostics ===
    /// Retain every result in the returned cycle statistics.
    #[serde(default)]
    pub diagnostics_enabled: bool,

    /// Number of recent cycle timings kept in memory.
    #[serde(default = "default_timing_history_capacity")]
    pub timing_history_capacity: usize,
}

fn default_investment_max() -> Decimal {
    Decimal::ONE
}

fn default_investment_step() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn default_taker_fee() -> Decimal {
    Decimal::new(1, 1) // 0.1%
}

fn default_timing_history_capacity() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            investment_min: None,
            investment_max: default_investment_max(),
            investment_step: default_investment_step(),
            taker_fee: default_taker_fee(),
            execution_strategy: ExecutionStrategy::default(),
            diagnostics_enabled: false,
            timing_history_capacity: default_timing_history_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.investment_step <= Decimal::ZERO {
            return Err("INVESTMENT_STEP must be greater than 0".to_string());
        }

        if self.investment_max <= Decimal::ZERO {
            return Err("INVESTMENT_MAX must be greater than 0".to_string());
        }

        if self.first_investment() > self.investment_max {
            return Err("INVESTMENT_MIN must not exceed INVESTMENT_MAX".to_string());
        }

        if self.taker_fee < Decimal::ZERO {
            return Err("TAKER_FEE must not be negative".to_string());
        }

        if self.timing_history_capacity == 0 {
            return Err("TIMING_HISTORY_CAPACITY must be at least 1".to_string());
        }

        Ok(())
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self> {
        let config = Self::load()?;
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(config)
    }

    /// Execution strategy used for every leg.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// First investment the optimizer evaluates.
    pub fn first_investment(&self) -> Decimal {
        match self.investment_min {
            Some(min) if !min.is_zero() => min,
            _ => self.investment_step,
        }
    }

    /// Combined fee deduction for the three legs, in percent.
    pub fn round_trip_fee(&self) -> Decimal {
        self.taker_fee * Decimal::from(3)
    }
}
