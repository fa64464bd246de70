//! Tick and lot rounding
//!
//! Bids round down and asks round up to the tick, so rounding never tightens
//! the spread. Sizes round down to the lot; orders left with no size are dropped.

use log::debug;
use rust_decimal::Decimal;

use tiller_core::{ModelState, Order, Side};
use tiller_ports::{ProducerResult, Quote};

use crate::chain::ChainElement;

#[derive(Debug, Clone)]
pub struct RoundingElement {
    tick_size: Decimal,
    lot_size: Decimal,
}

impl RoundingElement {
    /// A zero tick or lot size leaves that dimension unrounded
    pub fn new(tick_size: Decimal, lot_size: Decimal) -> Self {
        Self {
            tick_size,
            lot_size,
        }
    }

    fn round_price(&self, price: Decimal, side: Side) -> Decimal {
        if self.tick_size <= Decimal::ZERO {
            return price;
        }
        let ticks = price / self.tick_size;
        let rounded = match side {
            Side::Buy => ticks.floor(),
            Side::Sell => ticks.ceil(),
        };
        rounded * self.tick_size
    }

    fn round_size(&self, quantity: Decimal) -> Decimal {
        if self.lot_size <= Decimal::ZERO {
            return quantity;
        }
        (quantity / self.lot_size).floor() * self.lot_size
    }

    fn round(&self, order: Order) -> Order {
        Order {
            price: self.round_price(order.price, order.side),
            quantity: self.round_size(order.quantity),
            ..order
        }
    }
}

impl ChainElement for RoundingElement {
    fn process(&self, state: &ModelState, quote: Quote) -> ProducerResult<Quote> {
        Ok(quote.map_orders(|orders| {
            orders
                .into_iter()
                .map(|order| self.round(order))
                .filter(|order| {
                    let keep = order.quantity > Decimal::ZERO && order.price > Decimal::ZERO;
                    if !keep {
                        debug!("[{}] dropping {} after rounding", state.market, order);
                    }
                    keep
                })
                .collect()
        }))
    }

    fn name(&self) -> &str {
        "Rounding"
    }
}
