//! Tiller Gateway
//!
//! Everything that talks to the remote venue. Provides:
//! - Bounded pause-then-retry execution for remote calls ([`RetryPolicy`])
//! - Exchange adapters implementing the remote ports (paper exchange)
//!
//! ## Architecture
//!
//! ```text
//!        MarketMaker
//!             │ current_orders / submit_batch
//!       ┌─────▼──────┐
//!       │ RetryPolicy│  pause, retry, give up after N attempts
//!       └─────┬──────┘
//!             │
//!       ┌─────▼──────┐
//!       │  Adapter   │  PaperExchange (in-memory) or a real venue
//!       └────────────┘
//! ```

pub mod adapters;
pub mod error;
pub mod retry;

// Re-export commonly used types
pub use adapters::paper::{PaperExchange, PaperExchangeConfig};
pub use error::{GatewayError, Result};
pub use retry::RetryPolicy;
