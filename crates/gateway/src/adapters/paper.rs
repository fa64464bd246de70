//! In-memory paper exchange
//!
//! Implements both remote ports over a single book guarded by a tokio mutex.
//! Behaves like a slow, eventually-consistent venue:
//!
//! - batches are validated in full, then applied all-or-nothing
//! - new orders only show up in `current_orders` after `visibility_lag` fetches
//! - the next submissions/fetches can be made to fail on demand

use async_trait::async_trait;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use tiller_core::{ClientId, Order};
use tiller_ports::{
    Operation, OperationBatch, Receipt, RemoteError, RemoteExecutor, RemoteOrderBook,
    RemoteResult,
};

/// Paper exchange configuration
#[derive(Debug, Clone, Default)]
pub struct PaperExchangeConfig {
    /// Number of fetches a newly placed order stays hidden for
    pub visibility_lag: usize,
}

#[derive(Debug)]
struct RestingOrder {
    order: Order,
    hidden_fetches: usize,
}

#[derive(Debug, Default)]
struct Book {
    resting: Vec<RestingOrder>,
    next_order_id: u64,
    submissions: usize,
    fetches: usize,
    fail_submissions: usize,
    fail_fetches: usize,
    reject_submissions: usize,
}

impl Book {
    fn position(&self, order: &Order) -> Option<usize> {
        self.resting.iter().position(|resting| same_order(&resting.order, order))
    }

    fn validate(&self, batch: &OperationBatch) -> RemoteResult<()> {
        for op in batch.operations() {
            match op {
                Operation::Cancel {
                    order,
                    ok_if_missing,
                } => {
                    if !ok_if_missing && self.position(order).is_none() {
                        return Err(RemoteError::OrderNotFound(describe(order)));
                    }
                }
                Operation::Place(order) => {
                    if order.price <= Decimal::ZERO {
                        return Err(RemoteError::Rejected(format!(
                            "non-positive price {}",
                            order.price
                        )));
                    }
                    if order.quantity <= Decimal::ZERO {
                        return Err(RemoteError::Rejected(format!(
                            "non-positive quantity {}",
                            order.quantity
                        )));
                    }
                }
                Operation::Crank | Operation::Settle | Operation::Redeem => {}
            }
        }
        Ok(())
    }

    fn remove(&mut self, order: &Order) -> bool {
        match self.position(order) {
            Some(idx) => {
                self.resting.remove(idx);
                true
            }
            None => false,
        }
    }

    fn rest(&mut self, order: Order, lag: usize) -> String {
        self.next_order_id += 1;
        let exchange_order_id = format!("paper-{}", self.next_order_id);
        self.resting.push(RestingOrder {
            order: order.with_exchange_order_id(exchange_order_id.clone()),
            hidden_fetches: lag,
        });
        exchange_order_id
    }
}

/// Cancels identify their target by exchange id when they have one, by client id otherwise
fn same_order(resting: &Order, target: &Order) -> bool {
    match (&target.exchange_order_id, target.client_id) {
        (Some(id), _) => resting.exchange_order_id.as_deref() == Some(id.as_str()),
        (None, Some(client_id)) => resting.client_id == Some(client_id),
        (None, None) => false,
    }
}

fn describe(order: &Order) -> String {
    match (&order.exchange_order_id, order.client_id) {
        (Some(id), _) => id.clone(),
        (None, Some(client_id)) => format!("client {}", client_id),
        (None, None) => order.to_string(),
    }
}

/// In-memory exchange implementing [`RemoteOrderBook`] and [`RemoteExecutor`]
pub struct PaperExchange {
    config: PaperExchangeConfig,
    book: Mutex<Book>,
}

impl PaperExchange {
    pub fn new(config: PaperExchangeConfig) -> Self {
        Self {
            config,
            book: Mutex::new(Book::default()),
        }
    }

    /// Make the next `n` batch submissions fail with a transient error
    pub async fn fail_next_submissions(&self, n: usize) {
        self.book.lock().await.fail_submissions = n;
    }

    /// Make the next `n` fetches fail with a transient error
    pub async fn fail_next_fetches(&self, n: usize) {
        self.book.lock().await.fail_fetches = n;
    }

    /// Make the next `n` batch submissions get rejected outright
    pub async fn reject_next_submissions(&self, n: usize) {
        self.book.lock().await.reject_submissions = n;
    }

    /// Remove a resting order as if it had been fully filled
    pub async fn fill(&self, client_id: ClientId) -> Option<Order> {
        let mut book = self.book.lock().await;
        let idx = book
            .resting
            .iter()
            .position(|resting| resting.order.client_id == Some(client_id))?;
        let filled = book.resting.remove(idx).order;
        info!("[paper] filled {}", filled);
        Some(filled)
    }

    /// Everything on the book, hidden or not
    pub async fn resting_orders(&self) -> Vec<Order> {
        let book = self.book.lock().await;
        book.resting.iter().map(|r| r.order.clone()).collect()
    }

    /// Number of `submit_batch` calls, failed ones included
    pub async fn submission_count(&self) -> usize {
        self.book.lock().await.submissions
    }

    /// Number of `current_orders` calls, failed ones included
    pub async fn fetch_count(&self) -> usize {
        self.book.lock().await.fetches
    }
}

impl Default for PaperExchange {
    fn default() -> Self {
        Self::new(PaperExchangeConfig::default())
    }
}

#[async_trait]
impl RemoteOrderBook for PaperExchange {
    async fn current_orders(&self) -> RemoteResult<Vec<Order>> {
        let mut book = self.book.lock().await;
        book.fetches += 1;

        if book.fail_fetches > 0 {
            book.fail_fetches -= 1;
            warn!("[paper] injected fetch failure");
            return Err(RemoteError::Transient("injected fetch failure".into()));
        }

        let mut visible = Vec::new();
        for resting in book.resting.iter_mut() {
            if resting.hidden_fetches == 0 {
                visible.push(resting.order.clone());
            } else {
                resting.hidden_fetches -= 1;
            }
        }
        Ok(visible)
    }
}

#[async_trait]
impl RemoteExecutor for PaperExchange {
    async fn submit_batch(&self, batch: OperationBatch) -> RemoteResult<Receipt> {
        let mut book = self.book.lock().await;
        book.submissions += 1;

        if book.fail_submissions > 0 {
            book.fail_submissions -= 1;
            warn!("[paper] injected submission failure");
            return Err(RemoteError::Transient("injected submission failure".into()));
        }
        if book.reject_submissions > 0 {
            book.reject_submissions -= 1;
            warn!("[paper] injected rejection");
            return Err(RemoteError::Rejected("injected rejection".into()));
        }

        book.validate(&batch)?;

        let mut receipt = Receipt {
            signature: format!("paper-tx-{}", book.submissions),
            cancelled: 0,
            placed: 0,
            cranked: 0,
            settled: 0,
        };

        for op in batch.into_operations() {
            match op {
                Operation::Cancel { order, .. } => {
                    if !book.remove(&order) {
                        debug!("[paper] cancel of missing {} ignored", describe(&order));
                    }
                    receipt.cancelled += 1;
                }
                Operation::Place(order) => {
                    let id = book.rest(order, self.config.visibility_lag);
                    debug!("[paper] resting {}", id);
                    receipt.placed += 1;
                }
                Operation::Crank => {
                    receipt.cranked += 1;
                }
                Operation::Settle | Operation::Redeem => {
                    receipt.settled += 1;
                }
            }
        }

        info!(
            "[paper] {} applied: {} cancelled, {} placed, {} settlement op(s)",
            receipt.signature, receipt.cancelled, receipt.placed, receipt.settled
        );
        Ok(receipt)
    }

    async fn cancel(&self, order: &Order, ok_if_missing: bool) -> RemoteResult<()> {
        let mut book = self.book.lock().await;
        if book.remove(order) || ok_if_missing {
            Ok(())
        } else {
            Err(RemoteError::OrderNotFound(describe(order)))
        }
    }
}
