//! Fixed-Spread Quoting
//!
//! Quotes one bid and one ask around the mid price:
//! - bid = mid - mid × spread_ratio, ask = mid + mid × spread_ratio
//! - size = total account value × position_size_ratio, expressed in base units
//! - suppresses quoting while no price is known

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tiller_core::{ModelState, Order, OrderType, Side};
use tiller_ports::{ProducerError, ProducerResult, Quote};

use crate::chain::ChainElement;

/// Configuration for fixed-spread quoting
#[derive(Debug, Clone)]
pub struct FixedSpreadConfig {
    /// Distance of each quote from mid, as a fraction of mid (0.005 = 0.5%)
    pub spread_ratio: Decimal,
    /// Fraction of total account value quoted on each side
    pub position_size_ratio: Decimal,
    pub order_type: OrderType,
}

impl Default for FixedSpreadConfig {
    fn default() -> Self {
        Self {
            spread_ratio: dec!(0.005),        // 0.5% either side
            position_size_ratio: dec!(0.01), // 1% of account value
            order_type: OrderType::PostOnly,
        }
    }
}

/// Prices a symmetric bid/ask pair around mid
pub struct FixedSpreadElement {
    config: FixedSpreadConfig,
}

impl FixedSpreadElement {
    pub fn new(config: FixedSpreadConfig) -> Self {
        Self { config }
    }

    /// Bid and ask prices for a given mid
    fn calculate_quotes(&self, mid: Decimal) -> (Decimal, Decimal) {
        let offset = mid * self.config.spread_ratio;
        (mid - offset, mid + offset)
    }

    /// Quote size in base units
    fn calculate_size(&self, state: &ModelState, mid: Decimal) -> Decimal {
        state.inventory.total_value(mid) * self.config.position_size_ratio / mid
    }
}

impl ChainElement for FixedSpreadElement {
    fn process(&self, state: &ModelState, quote: Quote) -> ProducerResult<Quote> {
        let Some(mid) = state.mid_price() else {
            debug!("[{}] no price available, suppressing", state.market);
            return Ok(quote.suppress());
        };
        if mid <= Decimal::ZERO {
            return Err(ProducerError::InvalidState(format!(
                "non-positive mid price {}",
                mid
            )));
        }

        let size = self.calculate_size(state, mid);
        if size <= Decimal::ZERO {
            warn!(
                "[{}] account value gives no size to quote, quoting nothing",
                state.market
            );
            return Ok(quote.map_orders(|_| Vec::new()));
        }

        let (bid, ask) = self.calculate_quotes(mid);
        debug!(
            "[{}] mid={} bid={} ask={} size={}",
            state.market, mid, bid, ask, size
        );

        let order_type = self.config.order_type;
        Ok(quote.map_orders(|mut orders| {
            orders.push(Order::new(Side::Buy, bid, size, order_type));
            orders.push(Order::new(Side::Sell, ask, size, order_type));
            orders
        }))
    }

    fn name(&self) -> &str {
        "FixedSpread"
    }
}
