use async_trait::async_trait;
use tiller_core::Order;

use crate::batch::{OperationBatch, Receipt};
use crate::error::RemoteResult;

/// Port for reading the orders currently resting on the remote book
///
/// The view is eventually consistent: orders placed moments ago may be
/// missing and orders cancelled moments ago may still be listed.
#[async_trait]
pub trait RemoteOrderBook: Send + Sync {
    async fn current_orders(&self) -> RemoteResult<Vec<Order>>;
}

/// Port for mutating the remote book
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Submit every operation of the batch as one atomic unit
    async fn submit_batch(&self, batch: OperationBatch) -> RemoteResult<Receipt>;

    /// Cancel a single order outside of a batch
    ///
    /// With `ok_if_missing` an order that no longer exists is not an error.
    async fn cancel(&self, order: &Order, ok_if_missing: bool) -> RemoteResult<()>;
}
