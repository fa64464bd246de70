use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Symbol, Timestamp};

/// Top of book and mid price observed for a market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub bid: Decimal,
    pub ask: Decimal,
    pub mid: Decimal,
}

impl PriceSnapshot {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self {
            bid,
            ask,
            mid: (bid + ask) / Decimal::TWO,
        }
    }

    /// Snapshot with a single reference price (e.g. an oracle)
    pub fn from_mid(mid: Decimal) -> Self {
        Self {
            bid: mid,
            ask: mid,
            mid,
        }
    }

    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

/// Balances held for the market
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Base token balance
    pub base: Decimal,
    /// Quote token balance
    pub quote: Decimal,
    /// Accrued liquidity incentives not yet redeemed
    pub liquidity_incentives: Decimal,
}

impl Inventory {
    pub fn new(base: Decimal, quote: Decimal) -> Self {
        Self {
            base,
            quote,
            liquidity_incentives: Decimal::ZERO,
        }
    }

    pub fn with_liquidity_incentives(mut self, value: Decimal) -> Self {
        self.liquidity_incentives = value;
        self
    }

    /// Total value in quote terms at the given price
    pub fn total_value(&self, price: Decimal) -> Decimal {
        self.base * price + self.quote
    }
}

/// Everything a quoting strategy may look at for one pulse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub market: Symbol,
    pub price: Option<PriceSnapshot>,
    pub inventory: Inventory,
    pub observed_at: Timestamp,
}

impl ModelState {
    pub fn new(market: impl Into<Symbol>, inventory: Inventory, observed_at: Timestamp) -> Self {
        Self {
            market: market.into(),
            price: None,
            inventory,
            observed_at,
        }
    }

    pub fn with_price(mut self, price: PriceSnapshot) -> Self {
        self.price = Some(price);
        self
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        self.price.map(|p| p.mid)
    }
}
