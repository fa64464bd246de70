//! Simulated model state for paper trading
//!
//! Random-walks a reference price and reports it together with a fixed
//! inventory whose liquidity incentives accrue a little every pulse.

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use tiller_core::{Inventory, ModelState, PriceSnapshot};
use tiller_ports::{Clock, ProducerError, ProducerResult};

use crate::config::PaperConfig;
use crate::scheduler::StateSource;

/// Random-walk [`StateSource`]
pub struct RandomWalkSource {
    market: String,
    price: Decimal,
    config: PaperConfig,
    inventory: Inventory,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl RandomWalkSource {
    pub fn new(market: impl Into<String>, config: PaperConfig, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            market: market.into(),
            price: config.initial_price,
            inventory: Inventory::new(config.base_balance, config.quote_balance),
            config,
            clock,
            rng,
        }
    }

    /// Current reference price
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Move the price by up to ± volatility
    fn step(&mut self) -> Decimal {
        // Thousandths of the configured volatility, in [-1000, 1000]
        let draw: i64 = self.rng.gen_range(-1000..=1000);
        let change = Decimal::new(draw, 3) * self.config.volatility;
        self.price = (self.price * (Decimal::ONE + change)).round_dp(6);
        self.price
    }
}

#[async_trait]
impl StateSource for RandomWalkSource {
    async fn model_state(&mut self) -> ProducerResult<ModelState> {
        let mid = self.step();
        if mid <= Decimal::ZERO {
            return Err(ProducerError::InvalidState(format!(
                "simulated price fell to {}",
                mid
            )));
        }

        let half_spread = mid * self.config.book_half_spread_ratio;
        self.inventory.liquidity_incentives += self.config.incentive_per_pulse;

        Ok(ModelState::new(self.market.clone(), self.inventory, self.clock.now())
            .with_price(PriceSnapshot::new(mid - half_spread, mid + half_spread)))
    }
}
