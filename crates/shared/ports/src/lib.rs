//! Tiller Ports
//!
//! Port definitions (traits) for the Tiller market maker.
//! These define the boundaries between the quoting cycle and the outside world.
//!
//! ```text
//!        ModelState
//!            │
//!   ┌────────▼──────────────┐
//!   │ DesiredOrdersProducer │ ──► Quote (orders | suppressed)
//!   └───────────────────────┘
//!
//!   ┌───────────────────────┐
//!   │ RemoteOrderBook       │ ──► Vec<Order> (possibly stale)
//!   └───────────────────────┘
//!
//!   OperationBatch ──► ┌────────────────┐
//!                      │ RemoteExecutor │ ──► Receipt
//!                      └────────────────┘
//! ```

mod batch;
mod clock;
mod error;
mod producer;
mod remote;

pub use batch::{Operation, OperationBatch, Receipt};
pub use clock::Clock;
pub use error::{ProducerError, ProducerResult, RemoteError, RemoteResult};
pub use producer::{DesiredOrdersProducer, Quote};
pub use remote::{RemoteExecutor, RemoteOrderBook};
