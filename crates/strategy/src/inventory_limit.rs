//! Inventory limits
//!
//! Stops adding to a position that is already at its limit: no more buys at or
//! above `max_base`, no more sells at or below `min_base`.

use log::info;
use rust_decimal::Decimal;

use tiller_core::{ModelState, Side};
use tiller_ports::{ProducerResult, Quote};

use crate::chain::ChainElement;

#[derive(Debug, Clone, Default)]
pub struct InventoryLimitElement {
    /// Base balance at which buys stop
    pub max_base: Option<Decimal>,
    /// Base balance at which sells stop
    pub min_base: Option<Decimal>,
}

impl InventoryLimitElement {
    pub fn new(max_base: Option<Decimal>, min_base: Option<Decimal>) -> Self {
        Self { max_base, min_base }
    }

    fn allows(&self, side: Side, base: Decimal) -> bool {
        match side {
            Side::Buy => self.max_base.is_none_or(|max| base < max),
            Side::Sell => self.min_base.is_none_or(|min| base > min),
        }
    }
}

impl ChainElement for InventoryLimitElement {
    fn process(&self, state: &ModelState, quote: Quote) -> ProducerResult<Quote> {
        if quote.orders().is_empty() {
            return Ok(quote);
        }

        let base = state.inventory.base;
        let quote = quote.map_orders(|orders| {
            orders
                .into_iter()
                .filter(|order| self.allows(order.side, base))
                .collect()
        });

        if quote.orders().is_empty() {
            info!(
                "[{}] base balance {} blocks both sides, suppressing",
                state.market, base
            );
            return Ok(quote.suppress());
        }
        Ok(quote)
    }

    fn name(&self) -> &str {
        "InventoryLimit"
    }
}
