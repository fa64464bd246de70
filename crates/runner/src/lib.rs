//! Tiller Runner - Market Making Cycle
//!
//! Orchestrates one market maker per market:
//!
//! - **MarketMaker**: one pulse = quote, merge remote view, reconcile, submit one batch
//! - **PulseScheduler**: drives pulses on an interval with a per-pulse timeout
//! - **Config**: JSON configuration for the `tiller` binary
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────┐
//!                 │ PulseScheduler  │ interval + timeout
//!                 └────────┬────────┘
//!                          │ ModelState
//!                          ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                       MarketMaker                          │
//! │                                                            │
//! │  Producer ──► Quote ──┐                                    │
//! │                       ▼                                    │
//! │  RemoteOrderBook ──► OrderTracker ──► OrderReconciler      │
//! │                                           │                │
//! │                     cancels, places, crank, settle, redeem │
//! │                                           ▼                │
//! │                                    OperationBatch          │
//! └───────────────────────────────────────────┼────────────────┘
//!                                             │ RetryPolicy
//!                                             ▼
//!                                     RemoteExecutor
//!                                             │
//!                             PulseEvent ◄────┘ (broadcast)
//! ```

pub mod config;
pub mod error;
pub mod market_maker;
pub mod price_feed;
pub mod scheduler;

// Re-export main types
pub use config::{ConfigError, PaperConfig, QuotingConfig, RunnerConfig};
pub use error::CycleError;
pub use market_maker::{CycleConfig, MarketMaker, PulseEvent, PulseOutcome, log_pulse_events};
pub use price_feed::RandomWalkSource;
pub use scheduler::{PulseScheduler, SchedulerConfig, SchedulerStats, StateSource};
