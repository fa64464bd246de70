use tiller_core::{ModelState, Order};

use crate::error::ProducerResult;

/// Output of a desired-orders producer
///
/// A quote is either a list of orders to keep on the book or suppressed.
/// Suppression is sticky: a suppressed quote carries no orders and there is
/// no way to turn it back into a live one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quote {
    orders: Vec<Order>,
    suppressed: bool,
}

impl Quote {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            suppressed: false,
        }
    }

    /// A quote asking for nothing on the book (cancels everything)
    pub fn empty() -> Self {
        Self::default()
    }

    /// A quote asking the cycle to skip this pulse entirely
    pub fn suppressed() -> Self {
        Self {
            orders: Vec::new(),
            suppressed: true,
        }
    }

    /// Consume this quote and return a suppressed one
    pub fn suppress(self) -> Self {
        Self::suppressed()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Transform the orders of a live quote. A suppressed quote passes through.
    pub fn map_orders<F>(self, f: F) -> Self
    where
        F: FnOnce(Vec<Order>) -> Vec<Order>,
    {
        if self.suppressed {
            return self;
        }
        Self::new(f(self.orders))
    }
}

/// Port for the component that decides what should be on the book
///
/// Called once per pulse with the latest model state. Pure with respect to the
/// remote system: it must not place or cancel anything itself.
pub trait DesiredOrdersProducer: Send + Sync {
    fn desired_orders(&self, state: &ModelState) -> ProducerResult<Quote>;

    fn name(&self) -> &str {
        "DesiredOrdersProducer"
    }
}
