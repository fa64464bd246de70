//! Tiller Core Domain
//!
//! Pure domain types for the Tiller market maker.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{ClientId, Inventory, ModelState, Order, OrderType, PriceSnapshot, Side};
pub use values::{Price, Quantity, Symbol, Timestamp};
