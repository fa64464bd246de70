use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ClientId, OrderType, Side};

/// A quote order, either desired by the strategy or resting on the remote book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub order_type: OrderType,
    /// Assigned by the exchange once the order is live
    pub exchange_order_id: Option<String>,
    /// Assigned locally before submission
    pub client_id: Option<ClientId>,
}

impl Order {
    pub fn new(side: Side, price: Decimal, quantity: Decimal, order_type: OrderType) -> Self {
        Self {
            side,
            price,
            quantity,
            order_type,
            exchange_order_id: None,
            client_id: None,
        }
    }

    /// Post-only buy order
    pub fn buy(price: Decimal, quantity: Decimal) -> Self {
        Self::new(Side::Buy, price, quantity, OrderType::PostOnly)
    }

    /// Post-only sell order
    pub fn sell(price: Decimal, quantity: Decimal) -> Self {
        Self::new(Side::Sell, price, quantity, OrderType::PostOnly)
    }

    /// Copy of this order carrying the given correlation id
    pub fn with_client_id(&self, client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..self.clone()
        }
    }

    /// Copy of this order carrying the given exchange id
    pub fn with_exchange_order_id(&self, exchange_order_id: impl Into<String>) -> Self {
        Self {
            exchange_order_id: Some(exchange_order_id.into()),
            ..self.clone()
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {}", self.side, self.quantity, self.price)?;
        if let Some(client_id) = self.client_id {
            write!(f, " [client {}]", client_id)?;
        }
        if let Some(exchange_order_id) = &self.exchange_order_id {
            write!(f, " [exchange {}]", exchange_order_id)?;
        }
        Ok(())
    }
}
