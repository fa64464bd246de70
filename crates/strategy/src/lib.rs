//! Tiller Strategy Framework
//!
//! Builds the desired quote for each pulse out of small composable elements:
//! - A pricing element turns the model state into a bid and an ask
//! - Filter elements drop or adjust orders (inventory limits, tick/lot rounding)
//! - Any element may suppress quoting for the pulse, and that decision sticks
//!
//! ## Architecture
//!
//! ```text
//! ModelState ──► ┌──────────────────────────────────────────────┐
//!                │                 OrderChain                   │
//!                │  FixedSpread ──► InventoryLimit ──► Rounding │
//!                └──────────────────────┬───────────────────────┘
//!                                       │ Quote
//!                                       ▼
//!                                  MarketMaker
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiller_strategy::{FixedSpreadElement, OrderChain, RoundingElement};
//!
//! let chain = OrderChain::new()
//!     .with(FixedSpreadElement::new(FixedSpreadConfig::default()))
//!     .with(RoundingElement::new(dec!(0.01), dec!(0.001)));
//! let quote = chain.desired_orders(&state)?;
//! ```

pub mod chain;
pub mod fixed_spread;
pub mod inventory_limit;
pub mod rounding;

// Re-export main types
pub use chain::{ChainElement, OrderChain};
pub use fixed_spread::{FixedSpreadConfig, FixedSpreadElement};
pub use inventory_limit::InventoryLimitElement;
pub use rounding::RoundingElement;
