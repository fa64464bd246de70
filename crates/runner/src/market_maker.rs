//! Market Making Cycle
//!
//! One [`MarketMaker`] owns the in-flight order state for one market and runs
//! pulses against it, one at a time:
//!
//! 1. Ask the producer for a quote; a suppressed quote skips the pulse
//! 2. Fetch the remote order view and merge in-flight orders into it
//! 3. Reconcile existing orders against desired ones
//! 4. Cancel stale orders (already-gone orders are fine)
//! 5. Tag and track new orders before they are submitted
//! 6. Submit cancels, places, crank and settlement as one batch
//! 7. Publish a completed or failed event
//!
//! A failed pulse leaves tracked orders in place; the next pulse re-derives
//! everything from a fresh remote view. Tracked orders that never show up are
//! dropped after `max_unconfirmed_pulses` and quoted again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use tiller_core::{ClientId, ModelState, Timestamp};
use tiller_gateway::RetryPolicy;
use tiller_order_manager::{OrderReconciler, OrderTracker, ToleranceReconciler, TrackerConfig};
use tiller_ports::{
    Clock, DesiredOrdersProducer, OperationBatch, Receipt, RemoteError, RemoteExecutor,
    RemoteOrderBook,
};

use crate::error::CycleError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Per-market cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Relative price/size distance within which an existing order is kept
    pub tolerance: Decimal,
    /// Redeem liquidity incentives once accrued value exceeds this
    pub redeem_threshold: Option<Decimal>,
    /// Append a crank operation to every batch
    pub crank_each_pulse: bool,
    /// Append a settle operation to every batch
    pub settle_each_pulse: bool,
    /// Pauses between attempts to fetch the remote view (one attempt per pause)
    pub fetch_retry_pauses_ms: Vec<u64>,
    /// Pauses between attempts to submit a batch (one attempt per pause)
    pub submit_retry_pauses_ms: Vec<u64>,
    /// Maximum in-flight orders remembered
    pub max_tracked: usize,
    /// Pulses an in-flight order may stay invisible before it is given up
    pub max_unconfirmed_pulses: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tolerance: dec!(0.001),
            redeem_threshold: None,
            crank_each_pulse: true,
            settle_each_pulse: true,
            fetch_retry_pauses_ms: vec![100, 200, 400],
            submit_retry_pauses_ms: vec![100, 200, 400],
            max_tracked: TrackerConfig::default().max_tracked,
            max_unconfirmed_pulses: TrackerConfig::default().max_unconfirmed_pulses,
        }
    }
}

fn pauses(ms: &[u64]) -> Vec<Duration> {
    ms.iter().copied().map(Duration::from_millis).collect()
}

/// Published after every pulse that was not skipped
#[derive(Debug, Clone)]
pub enum PulseEvent {
    Completed { at: Timestamp },
    Failed { at: Timestamp, error: Arc<CycleError> },
}

/// What a pulse did
#[derive(Debug, Clone)]
pub enum PulseOutcome {
    /// The producer suppressed quoting; nothing was touched
    Skipped,
    /// Converged; `None` when there was nothing to submit
    Completed(Option<Receipt>),
    Failed(Arc<CycleError>),
}

impl PulseOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PulseOutcome::Completed(_))
    }
}

/// Log every pulse event until the market maker is dropped
///
/// A receiver that falls behind skips the overwritten events and carries on.
/// Returns the number of events logged.
pub async fn log_pulse_events(mut events: broadcast::Receiver<PulseEvent>) -> usize {
    let mut logged = 0;
    loop {
        match events.recv().await {
            Ok(PulseEvent::Completed { at }) => info!("Pulse completed at {}", at),
            Ok(PulseEvent::Failed { at, error }) => error!("Pulse failed at {}: {}", at, error),
            Err(RecvError::Lagged(missed)) => {
                warn!("Event log fell behind, {} event(s) dropped", missed);
                continue;
            }
            Err(RecvError::Closed) => return logged,
        }
        logged += 1;
    }
}

/// Retry only what the venue calls transient; everything else comes back at once
async fn retry_transient<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    policy
        .run(|| {
            let attempt = operation();
            async move {
                match attempt.await {
                    Err(e) if e.is_transient() => Err(e),
                    other => Ok(other),
                }
            }
        })
        .await
        .and_then(|outcome| outcome)
}

/// Keeps one market's resting quotes in line with what the producer wants
pub struct MarketMaker {
    market: String,
    config: CycleConfig,
    producer: Arc<dyn DesiredOrdersProducer>,
    book: Arc<dyn RemoteOrderBook>,
    executor: Arc<dyn RemoteExecutor>,
    reconciler: Box<dyn OrderReconciler>,
    tracker: OrderTracker,
    clock: Arc<dyn Clock>,
    fetch_policy: RetryPolicy,
    submit_policy: RetryPolicy,
    rng: StdRng,
    events: broadcast::Sender<PulseEvent>,
}

impl MarketMaker {
    /// Create a market maker with a tolerance reconciler and an empty tracker
    ///
    /// Fails when either retry pause list is empty.
    pub fn new(
        market: impl Into<String>,
        config: CycleConfig,
        producer: Arc<dyn DesiredOrdersProducer>,
        book: Arc<dyn RemoteOrderBook>,
        executor: Arc<dyn RemoteExecutor>,
        clock: Arc<dyn Clock>,
    ) -> tiller_gateway::Result<Self> {
        let market = market.into();
        let fetch_policy = RetryPolicy::new(
            format!("{} fetch", market),
            pauses(&config.fetch_retry_pauses_ms),
        )?;
        let submit_policy = RetryPolicy::new(
            format!("{} submit", market),
            pauses(&config.submit_retry_pauses_ms),
        )?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            reconciler: Box::new(ToleranceReconciler::new(config.tolerance)),
            tracker: OrderTracker::new(TrackerConfig {
                max_tracked: config.max_tracked,
                max_unconfirmed_pulses: config.max_unconfirmed_pulses,
            }),
            market,
            config,
            producer,
            book,
            executor,
            clock,
            fetch_policy,
            submit_policy,
            rng: StdRng::from_entropy(),
            events,
        })
    }

    /// Replace the reconciliation strategy
    pub fn with_reconciler(mut self, reconciler: Box<dyn OrderReconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Make client id generation reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn tracker(&self) -> &OrderTracker {
        &self.tracker
    }

    /// Receive every pulse event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PulseEvent> {
        self.events.subscribe()
    }

    /// Run one pulse. Never fails; failures are reported in the outcome and as an event.
    pub async fn pulse(&mut self, state: &ModelState) -> PulseOutcome {
        match self.try_pulse(state).await {
            Ok(outcome) => {
                if outcome.is_completed() {
                    self.publish(PulseEvent::Completed {
                        at: self.clock.now(),
                    });
                }
                outcome
            }
            Err(e) => {
                warn!("[{}] pulse failed: {}", self.market, e);
                let error = Arc::new(e);
                self.publish(PulseEvent::Failed {
                    at: self.clock.now(),
                    error: error.clone(),
                });
                PulseOutcome::Failed(error)
            }
        }
    }

    /// Publish a failure that happened outside `pulse`, e.g. a timeout
    pub fn notify_failure(&self, error: CycleError) {
        warn!("[{}] pulse failed: {}", self.market, error);
        self.publish(PulseEvent::Failed {
            at: self.clock.now(),
            error: Arc::new(error),
        });
    }

    async fn try_pulse(&mut self, state: &ModelState) -> Result<PulseOutcome, CycleError> {
        let quote = self.producer.desired_orders(state)?;
        if quote.is_suppressed() {
            info!("[{}] quoting suppressed, skipping pulse", self.market);
            return Ok(PulseOutcome::Skipped);
        }

        let remote = self.fetch_remote_orders().await?;
        let existing = self.tracker.existing_orders(&remote);
        let result = self.reconciler.reconcile(&existing, quote.orders());
        debug!(
            "[{}] {} existing, {} desired: cancel {}, place {}",
            self.market,
            existing.len(),
            quote.orders().len(),
            result.to_cancel.len(),
            result.to_place.len()
        );

        let cancelled: Vec<ClientId> = result.to_cancel.iter().filter_map(|o| o.client_id).collect();

        let mut batch = OperationBatch::new();
        for order in result.to_cancel {
            batch.cancel(order, true);
        }
        for order in result.to_place {
            let client_id = self.tracker.next_client_id(&mut self.rng);
            let order = order.with_client_id(client_id);
            self.tracker.track(order.clone())?;
            batch.place(order);
        }
        if self.config.crank_each_pulse {
            batch.crank();
        }
        if self.config.settle_each_pulse {
            batch.settle();
        }
        if self.should_redeem(state) {
            info!(
                "[{}] redeeming {} in liquidity incentives",
                self.market, state.inventory.liquidity_incentives
            );
            batch.redeem();
        }

        if batch.is_empty() {
            debug!("[{}] book already matches quote", self.market);
            return Ok(PulseOutcome::Completed(None));
        }

        let receipt = self.submit(batch).await?;
        for client_id in cancelled {
            self.tracker.untrack(client_id);
        }

        info!(
            "[{}] pulse complete ({}): {} cancelled, {} placed",
            self.market, receipt.signature, receipt.cancelled, receipt.placed
        );
        Ok(PulseOutcome::Completed(Some(receipt)))
    }

    /// Cancel every order believed to be live, remote or in flight
    ///
    /// Returns the number of cancels issued.
    pub async fn cancel_all(&mut self) -> Result<usize, CycleError> {
        let remote = self.fetch_remote_orders().await?;
        let existing = self.tracker.existing_orders(&remote);

        for order in &existing {
            let executor = &self.executor;
            retry_transient(self.submit_policy.clone(), || executor.cancel(order, true)).await?;
            if let Some(client_id) = order.client_id {
                self.tracker.untrack(client_id);
            }
        }

        info!("[{}] cancelled {} order(s)", self.market, existing.len());
        Ok(existing.len())
    }

    async fn fetch_remote_orders(&self) -> Result<Vec<tiller_core::Order>, RemoteError> {
        let book = &self.book;
        self.fetch_policy
            .clone()
            .run(|| book.current_orders())
            .await
    }

    async fn submit(&self, batch: OperationBatch) -> Result<Receipt, RemoteError> {
        let executor = &self.executor;
        retry_transient(self.submit_policy.clone(), || {
            executor.submit_batch(batch.clone())
        })
        .await
    }

    fn should_redeem(&self, state: &ModelState) -> bool {
        self.config
            .redeem_threshold
            .is_some_and(|threshold| state.inventory.liquidity_incentives > threshold)
    }

    fn publish(&self, event: PulseEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
