//! Chain of quote-building elements

use log::{debug, info};
use tiller_core::ModelState;
use tiller_ports::{DesiredOrdersProducer, ProducerResult, Quote};

/// One step of an [`OrderChain`]
///
/// Receives the quote built so far and returns the next one. Returning a
/// suppressed quote stops the chain.
pub trait ChainElement: Send + Sync {
    fn process(&self, state: &ModelState, quote: Quote) -> ProducerResult<Quote>;

    fn name(&self) -> &str;
}

/// Folds its elements over an initially empty quote
#[derive(Default)]
pub struct OrderChain {
    elements: Vec<Box<dyn ChainElement>>,
}

impl OrderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element (builder style)
    pub fn with<E: ChainElement + 'static>(mut self, element: E) -> Self {
        self.elements.push(Box::new(element));
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl DesiredOrdersProducer for OrderChain {
    fn desired_orders(&self, state: &ModelState) -> ProducerResult<Quote> {
        let mut quote = Quote::empty();
        for element in &self.elements {
            quote = element.process(state, quote)?;
            if quote.is_suppressed() {
                info!("[{}] {} suppressed quoting", state.market, element.name());
                return Ok(quote);
            }
            debug!(
                "[{}] after {}: {} order(s)",
                state.market,
                element.name(),
                quote.orders().len()
            );
        }
        Ok(quote)
    }

    fn name(&self) -> &str {
        "OrderChain"
    }
}
