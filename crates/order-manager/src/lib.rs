//! Tiller Order Manager
//!
//! Decides which remote operations a pulse needs:
//! - **Order Tracking**: remembers orders submitted but not yet visible remotely
//! - **Reconciliation**: diffs desired orders against existing ones, within a tolerance
//!
//! ## Architecture
//!
//! ```text
//! Remote view ──► ┌──────────────────────┐
//!                 │     OrderTracker     │  remote ∪ in-flight
//!                 └──────────┬───────────┘
//!                            │ existing
//! Desired ─────► ┌───────────▼──────────┐
//!                │   OrderReconciler    │
//!                └───────────┬──────────┘
//!                            │
//!                 to_cancel / to_place
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiller_order_manager::{OrderReconciler, OrderTracker, ToleranceReconciler};
//!
//! let mut tracker = OrderTracker::default();
//! let reconciler = ToleranceReconciler::new(dec!(0.01));
//!
//! let existing = tracker.existing_orders(&remote_view);
//! let result = reconciler.reconcile(&existing, &desired);
//! ```

pub mod error;
pub mod reconciler;
pub mod tracker;

// Re-export main types
pub use error::{Error, Result};
pub use reconciler::{
    OrderReconciler, ReconciliationResult, ReplaceAllReconciler, ToleranceReconciler,
};
pub use tracker::{OrderTracker, TrackerConfig};
