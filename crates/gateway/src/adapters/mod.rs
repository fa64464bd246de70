//! Exchange adapters
//!
//! Each adapter implements the `RemoteOrderBook` and `RemoteExecutor` ports
//! for one venue.

pub mod paper;
