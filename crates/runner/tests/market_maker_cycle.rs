//! Market making cycle against the paper exchange
//!
//! Covers the pulse contract end to end:
//! - suppression touches nothing and publishes nothing
//! - small drift is kept, large drift is replaced
//! - transient submission failures are retried, rejections are not
//! - failed pulses publish exactly one event and keep optimistic tracking
//! - tracked orders that never show up are given up and quoted again
//! - a lagging remote view never leads to duplicate quotes

use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::broadcast::error::TryRecvError;

use tiller_clock::ManualClock;
use tiller_core::{Inventory, ModelState, Order};
use tiller_gateway::{PaperExchange, PaperExchangeConfig};
use tiller_ports::{Clock, DesiredOrdersProducer, ProducerResult, Quote, RemoteError};
use tiller_runner::{CycleConfig, CycleError, MarketMaker, PulseEvent, PulseOutcome};

/// Producer returning whatever quote the test last set
struct ScriptedProducer {
    quote: Mutex<Quote>,
}

impl ScriptedProducer {
    fn new(quote: Quote) -> Arc<Self> {
        Arc::new(Self {
            quote: Mutex::new(quote),
        })
    }

    fn set(&self, quote: Quote) {
        *self.quote.lock().unwrap() = quote;
    }
}

impl DesiredOrdersProducer for ScriptedProducer {
    fn desired_orders(&self, _state: &ModelState) -> ProducerResult<Quote> {
        Ok(self.quote.lock().unwrap().clone())
    }
}

struct Harness {
    producer: Arc<ScriptedProducer>,
    exchange: Arc<PaperExchange>,
    clock: Arc<ManualClock>,
    market_maker: MarketMaker,
}

fn fast_config() -> CycleConfig {
    CycleConfig {
        tolerance: dec!(0.01),
        crank_each_pulse: false,
        settle_each_pulse: false,
        fetch_retry_pauses_ms: vec![0, 0, 0],
        submit_retry_pauses_ms: vec![0, 0, 0],
        ..Default::default()
    }
}

fn harness(config: CycleConfig, lag: usize, quote: Quote) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let producer = ScriptedProducer::new(quote);
    let exchange = Arc::new(PaperExchange::new(PaperExchangeConfig {
        visibility_lag: lag,
    }));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ));
    let market_maker = MarketMaker::new(
        "SOL/USDC",
        config,
        producer.clone(),
        exchange.clone(),
        exchange.clone(),
        clock.clone(),
    )
    .unwrap()
    .with_seed(7);

    Harness {
        producer,
        exchange,
        clock,
        market_maker,
    }
}

fn state() -> ModelState {
    ModelState::new("SOL/USDC", Inventory::new(dec!(10), dec!(1000)), Utc::now())
}

fn two_sided() -> Quote {
    Quote::new(vec![Order::buy(dec!(99), dec!(1)), Order::sell(dec!(101), dec!(1))])
}

#[tokio::test]
async fn test_suppressed_pulse_does_nothing() {
    let mut h = harness(fast_config(), 0, Quote::suppressed());
    let mut events = h.market_maker.subscribe();

    let outcome = h.market_maker.pulse(&state()).await;

    assert!(matches!(outcome, PulseOutcome::Skipped));
    assert_eq!(h.exchange.fetch_count().await, 0);
    assert_eq!(h.exchange.submission_count().await, 0);
    assert!(h.market_maker.tracker().is_empty());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_first_pulse_places_and_tracks() {
    let mut h = harness(fast_config(), 0, two_sided());
    let mut events = h.market_maker.subscribe();

    let outcome = h.market_maker.pulse(&state()).await;

    let receipt = match outcome {
        PulseOutcome::Completed(Some(receipt)) => receipt,
        other => panic!("expected a submitted batch, got {:?}", other),
    };
    assert_eq!(receipt.placed, 2);
    assert_eq!(receipt.cancelled, 0);

    let resting = h.exchange.resting_orders().await;
    assert_eq!(resting.len(), 2);
    assert!(resting.iter().all(|o| o.client_id.is_some()));
    assert_ne!(resting[0].client_id, resting[1].client_id);

    // Tracked until the remote view confirms them
    assert_eq!(h.market_maker.tracker().len(), 2);

    match events.try_recv() {
        Ok(PulseEvent::Completed { at }) => assert_eq!(at, h.clock.now()),
        other => panic!("expected completed event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_small_drift_kept_large_drift_replaced() {
    let mut h = harness(
        fast_config(),
        0,
        Quote::new(vec![Order::buy(dec!(10.00), dec!(100))]),
    );
    h.market_maker.pulse(&state()).await;

    // 0.5% away: nothing to do
    h.producer.set(Quote::new(vec![Order::buy(dec!(10.05), dec!(100))]));
    let outcome = h.market_maker.pulse(&state()).await;
    assert!(matches!(outcome, PulseOutcome::Completed(None)));
    assert_eq!(h.exchange.submission_count().await, 1);
    assert_eq!(h.exchange.resting_orders().await[0].price, dec!(10.00));

    // 2% away: cancel and replace in one batch
    h.producer.set(Quote::new(vec![Order::buy(dec!(10.20), dec!(100))]));
    let outcome = h.market_maker.pulse(&state()).await;
    let receipt = match outcome {
        PulseOutcome::Completed(Some(receipt)) => receipt,
        other => panic!("expected a submitted batch, got {:?}", other),
    };
    assert_eq!(receipt.cancelled, 1);
    assert_eq!(receipt.placed, 1);

    let resting = h.exchange.resting_orders().await;
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0].price, dec!(10.20));
}

#[tokio::test]
async fn test_transient_submit_failure_is_retried() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.exchange.fail_next_submissions(1).await;
    let mut events = h.market_maker.subscribe();

    let outcome = h.market_maker.pulse(&state()).await;

    assert!(outcome.is_completed());
    assert_eq!(h.exchange.submission_count().await, 2);
    assert_eq!(h.exchange.resting_orders().await.len(), 2);
    assert!(matches!(events.try_recv(), Ok(PulseEvent::Completed { .. })));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_rejection_fails_without_retry() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.exchange.reject_next_submissions(1).await;
    let mut events = h.market_maker.subscribe();

    let outcome = h.market_maker.pulse(&state()).await;

    let error = match outcome {
        PulseOutcome::Failed(error) => error,
        other => panic!("expected failure, got {:?}", other),
    };
    assert!(matches!(*error, CycleError::Remote(RemoteError::Rejected(_))));
    assert_eq!(h.exchange.submission_count().await, 1);
    assert!(matches!(events.try_recv(), Ok(PulseEvent::Failed { .. })));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_exhausted_retries_emit_one_failure_and_keep_tracking() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.exchange.fail_next_submissions(10).await;
    let mut events = h.market_maker.subscribe();

    let outcome = h.market_maker.pulse(&state()).await;

    let error = match outcome {
        PulseOutcome::Failed(error) => error,
        other => panic!("expected failure, got {:?}", other),
    };
    assert!(error.is_transient());
    // One attempt per configured pause
    assert_eq!(h.exchange.submission_count().await, 3);
    assert!(h.exchange.resting_orders().await.is_empty());

    // Optimistic entries survive the failure
    assert_eq!(h.market_maker.tracker().len(), 2);

    match events.try_recv() {
        Ok(PulseEvent::Failed { error, .. }) => assert!(error.is_transient()),
        other => panic!("expected failed event, got {:?}", other),
    }
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_failed_submission_is_requoted_after_bound() {
    let config = CycleConfig {
        max_unconfirmed_pulses: 2,
        ..fast_config()
    };
    let mut h = harness(config, 0, two_sided());
    h.exchange.fail_next_submissions(3).await;
    assert!(matches!(
        h.market_maker.pulse(&state()).await,
        PulseOutcome::Failed(_)
    ));

    // The unconfirmed entries stand in for the quote while within the bound
    for _ in 0..2 {
        let outcome = h.market_maker.pulse(&state()).await;
        assert!(matches!(outcome, PulseOutcome::Completed(None)));
        assert_eq!(h.market_maker.tracker().len(), 2);
    }
    assert!(h.exchange.resting_orders().await.is_empty());

    // Then they are given up and the quote goes out again, once
    for _ in 0..10 {
        assert!(h.market_maker.pulse(&state()).await.is_completed());
    }
    assert_eq!(h.exchange.resting_orders().await.len(), 2);
    assert_eq!(h.exchange.submission_count().await, 4);
    assert!(h.market_maker.tracker().is_empty());
}

#[tokio::test]
async fn test_fill_before_visible_is_requoted() {
    let config = CycleConfig {
        max_unconfirmed_pulses: 2,
        ..fast_config()
    };
    let mut h = harness(config, 1, two_sided());
    h.market_maker.pulse(&state()).await;

    // The bid fills before any fetch has shown it
    let bid_id = h
        .exchange
        .resting_orders()
        .await
        .iter()
        .find(|o| o.is_buy())
        .and_then(|o| o.client_id)
        .unwrap();
    h.exchange.fill(bid_id).await.unwrap();

    for _ in 0..10 {
        assert!(h.market_maker.pulse(&state()).await.is_completed());
    }

    let resting = h.exchange.resting_orders().await;
    assert_eq!(resting.len(), 2);
    assert_eq!(resting.iter().filter(|o| o.is_buy()).count(), 1);
    assert!(!h.market_maker.tracker().contains(bid_id));
    assert!(h.market_maker.tracker().is_empty());
}

#[tokio::test]
async fn test_cancel_all_forgets_unconfirmed_entries() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.exchange.fail_next_submissions(3).await;
    h.market_maker.pulse(&state()).await;
    assert_eq!(h.market_maker.tracker().len(), 2);

    assert_eq!(h.market_maker.cancel_all().await.unwrap(), 2);
    assert!(h.market_maker.tracker().is_empty());

    h.market_maker.pulse(&state()).await;
    assert_eq!(h.exchange.resting_orders().await.len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_fails_before_submission() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.exchange.fail_next_fetches(3).await;

    let outcome = h.market_maker.pulse(&state()).await;

    assert!(matches!(outcome, PulseOutcome::Failed(_)));
    assert_eq!(h.exchange.fetch_count().await, 3);
    assert_eq!(h.exchange.submission_count().await, 0);
    assert!(h.market_maker.tracker().is_empty());
}

#[tokio::test]
async fn test_lagging_view_never_duplicates_orders() {
    let mut h = harness(fast_config(), 2, two_sided());

    for _ in 0..6 {
        let outcome = h.market_maker.pulse(&state()).await;
        assert!(outcome.is_completed());
        assert_eq!(h.exchange.resting_orders().await.len(), 2);
    }

    // Only the first pulse had anything to submit
    assert_eq!(h.exchange.submission_count().await, 1);
    assert!(h.market_maker.tracker().is_empty());
}

#[tokio::test]
async fn test_stale_cancel_of_filled_order_succeeds() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.market_maker.pulse(&state()).await;

    // The bid fills before the next pulse; the tracker still remembers it
    let bid_id = h.exchange.resting_orders().await[0].client_id.unwrap();
    h.exchange.fill(bid_id).await.unwrap();

    // Quote moves, so the remembered bid is cancelled even though it is gone
    h.producer.set(Quote::new(vec![
        Order::buy(dec!(95), dec!(1)),
        Order::sell(dec!(101), dec!(1)),
    ]));
    let outcome = h.market_maker.pulse(&state()).await;

    let receipt = match outcome {
        PulseOutcome::Completed(Some(receipt)) => receipt,
        other => panic!("expected a submitted batch, got {:?}", other),
    };
    assert_eq!(receipt.cancelled, 1);
    assert_eq!(receipt.placed, 1);
    assert!(!h.market_maker.tracker().contains(bid_id));

    let prices: Vec<Decimal> = h
        .exchange
        .resting_orders()
        .await
        .iter()
        .map(|o| o.price)
        .collect();
    assert_eq!(prices, vec![dec!(101), dec!(95)]);
}

#[tokio::test]
async fn test_empty_quote_cancels_everything() {
    let mut h = harness(fast_config(), 0, two_sided());
    h.market_maker.pulse(&state()).await;

    h.producer.set(Quote::empty());
    let outcome = h.market_maker.pulse(&state()).await;

    let receipt = match outcome {
        PulseOutcome::Completed(Some(receipt)) => receipt,
        other => panic!("expected a submitted batch, got {:?}", other),
    };
    assert_eq!(receipt.cancelled, 2);
    assert!(h.exchange.resting_orders().await.is_empty());
}

#[tokio::test]
async fn test_crank_settle_and_redeem_appended() {
    let config = CycleConfig {
        crank_each_pulse: true,
        settle_each_pulse: true,
        redeem_threshold: Some(dec!(10)),
        ..fast_config()
    };
    let mut h = harness(config, 0, Quote::empty());

    let rich = ModelState::new(
        "SOL/USDC",
        Inventory::new(dec!(10), dec!(1000)).with_liquidity_incentives(dec!(12)),
        Utc::now(),
    );
    let PulseOutcome::Completed(Some(receipt)) = h.market_maker.pulse(&rich).await else {
        panic!("expected a submitted batch");
    };
    assert_eq!(receipt.cranked, 1);
    assert_eq!(receipt.settled, 2);

    let PulseOutcome::Completed(Some(receipt)) = h.market_maker.pulse(&state()).await else {
        panic!("expected a submitted batch");
    };
    assert_eq!(receipt.settled, 1);
}

#[tokio::test]
async fn test_every_subscriber_sees_events_in_order() {
    let mut h = harness(fast_config(), 0, two_sided());
    let mut first = h.market_maker.subscribe();
    let mut second = h.market_maker.subscribe();

    h.market_maker.pulse(&state()).await;
    h.clock.advance(Duration::seconds(30));
    h.exchange.reject_next_submissions(1).await;
    h.producer.set(Quote::empty());
    h.market_maker.pulse(&state()).await;

    for rx in [&mut first, &mut second] {
        assert!(matches!(rx.try_recv(), Ok(PulseEvent::Completed { .. })));
        match rx.try_recv() {
            Ok(PulseEvent::Failed { at, .. }) => assert_eq!(at, h.clock.now()),
            other => panic!("expected failed event, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_cancel_all_clears_remote_and_tracked() {
    let mut h = harness(fast_config(), 5, two_sided());
    h.market_maker.pulse(&state()).await;

    // Orders are still invisible remotely; only the tracker knows about them
    let cancelled = h.market_maker.cancel_all().await.unwrap();

    assert_eq!(cancelled, 2);
    assert!(h.exchange.resting_orders().await.is_empty());
    assert!(h.market_maker.tracker().is_empty());
}
