//! Runner configuration
//!
//! Loaded from a JSON file. Every section and field is optional and falls back
//! to the embedded defaults in `default_config.json`.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tiller_core::OrderType;
use tiller_strategy::{
    FixedSpreadConfig, FixedSpreadElement, InventoryLimitElement, OrderChain, RoundingElement,
};

use crate::market_maker::CycleConfig;
use crate::scheduler::SchedulerConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for the `tiller` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub market: String,
    pub pulse_interval_ms: u64,
    pub pulse_timeout_ms: u64,
    pub cycle: CycleConfig,
    pub quoting: QuotingConfig,
    pub paper: PaperConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            market: "SOL/USDC".to_string(),
            pulse_interval_ms: 30_000,
            pulse_timeout_ms: 20_000,
            cycle: CycleConfig::default(),
            quoting: QuotingConfig::default(),
            paper: PaperConfig::default(),
        }
    }
}

/// Quoting chain parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotingConfig {
    pub spread_ratio: Decimal,
    pub position_size_ratio: Decimal,
    pub order_type: OrderType,
    /// Zero disables price rounding
    pub tick_size: Decimal,
    /// Zero disables size rounding
    pub lot_size: Decimal,
    pub max_base: Option<Decimal>,
    pub min_base: Option<Decimal>,
}

impl Default for QuotingConfig {
    fn default() -> Self {
        let spread = FixedSpreadConfig::default();
        Self {
            spread_ratio: spread.spread_ratio,
            position_size_ratio: spread.position_size_ratio,
            order_type: spread.order_type,
            tick_size: dec!(0.01),
            lot_size: dec!(0.001),
            max_base: None,
            min_base: None,
        }
    }
}

impl QuotingConfig {
    /// Fixed spread, then inventory limits, then rounding
    pub fn build_chain(&self) -> OrderChain {
        OrderChain::new()
            .with(FixedSpreadElement::new(FixedSpreadConfig {
                spread_ratio: self.spread_ratio,
                position_size_ratio: self.position_size_ratio,
                order_type: self.order_type,
            }))
            .with(InventoryLimitElement::new(self.max_base, self.min_base))
            .with(RoundingElement::new(self.tick_size, self.lot_size))
    }
}

/// Paper trading simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    pub initial_price: Decimal,
    /// Maximum relative price move per pulse
    pub volatility: Decimal,
    /// Half the simulated top-of-book spread, relative to mid
    pub book_half_spread_ratio: Decimal,
    pub base_balance: Decimal,
    pub quote_balance: Decimal,
    pub incentive_per_pulse: Decimal,
    /// Fetches a new order stays invisible for
    pub visibility_lag: usize,
    /// Fixed seed for a reproducible price path
    pub seed: Option<u64>,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            initial_price: dec!(100),
            volatility: dec!(0.001),
            book_half_spread_ratio: dec!(0.0005),
            base_balance: dec!(10),
            quote_balance: dec!(1000),
            incentive_per_pulse: Decimal::ZERO,
            visibility_lag: 0,
            seed: None,
        }
    }
}

/// Load runner configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

impl RunnerConfig {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            pulse_interval: Duration::from_millis(self.pulse_interval_ms),
            pulse_timeout: Duration::from_millis(self.pulse_timeout_ms),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(msg: &str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg.to_string()))
        }

        if self.market.trim().is_empty() {
            return invalid("market must not be empty");
        }
        if self.pulse_interval_ms == 0 {
            return invalid("pulse_interval_ms must be positive");
        }
        if self.pulse_timeout_ms == 0 {
            return invalid("pulse_timeout_ms must be positive");
        }
        if self.cycle.tolerance < Decimal::ZERO {
            return invalid("cycle.tolerance must not be negative");
        }
        if self.cycle.fetch_retry_pauses_ms.is_empty() {
            return invalid("cycle.fetch_retry_pauses_ms needs at least one pause");
        }
        if self.cycle.submit_retry_pauses_ms.is_empty() {
            return invalid("cycle.submit_retry_pauses_ms needs at least one pause");
        }
        if self.cycle.max_tracked == 0 {
            return invalid("cycle.max_tracked must be positive");
        }
        if self.cycle.max_unconfirmed_pulses <= self.paper.visibility_lag {
            return invalid("cycle.max_unconfirmed_pulses must exceed paper.visibility_lag");
        }
        if self.quoting.spread_ratio < Decimal::ZERO {
            return invalid("quoting.spread_ratio must not be negative");
        }
        if self.quoting.position_size_ratio <= Decimal::ZERO {
            return invalid("quoting.position_size_ratio must be positive");
        }
        if self.quoting.tick_size < Decimal::ZERO || self.quoting.lot_size < Decimal::ZERO {
            return invalid("quoting.tick_size and quoting.lot_size must not be negative");
        }
        if self.paper.initial_price <= Decimal::ZERO {
            return invalid("paper.initial_price must be positive");
        }
        Ok(())
    }
}
