//! Pulse Scheduler
//!
//! Drives one [`MarketMaker`] on a fixed interval until told to stop:
//!
//! ```text
//! startup ──► cancel_all ──► tick ──► state ──► pulse (timeout) ──► tick ...
//!                                                                  │
//!                                  shutdown signal ──► cancel_all ─┴─► stats
//! ```
//!
//! Pulses never overlap: the next tick is only awaited once the current pulse
//! has finished or timed out.

use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, timeout};

use tiller_core::ModelState;
use tiller_ports::ProducerResult;

use crate::error::CycleError;
use crate::market_maker::{MarketMaker, PulseOutcome};

/// Source of the model state handed to each pulse
#[async_trait]
pub trait StateSource: Send {
    async fn model_state(&mut self) -> ProducerResult<ModelState>;
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub pulse_interval: Duration,
    /// Wall-clock budget for one pulse, retries included
    pub pulse_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pulse_interval: Duration::from_secs(30),
            pulse_timeout: Duration::from_secs(20),
        }
    }
}

/// Counters collected over a scheduler run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub pulses: usize,
    pub completed: usize,
    pub skipped: usize,
    /// Failed pulses, timeouts included
    pub failed: usize,
    pub timed_out: usize,
    pub cancelled_at_startup: usize,
    pub cancelled_at_shutdown: usize,
}

pub struct PulseScheduler<S: StateSource> {
    config: SchedulerConfig,
    market_maker: MarketMaker,
    source: S,
    stats: SchedulerStats,
}

impl<S: StateSource> PulseScheduler<S> {
    pub fn new(config: SchedulerConfig, market_maker: MarketMaker, source: S) -> Self {
        Self {
            config,
            market_maker,
            source,
            stats: SchedulerStats::default(),
        }
    }

    /// Run until `shutdown` turns true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SchedulerStats {
        let market = self.market_maker.market().to_string();
        info!(
            "[{}] scheduler started ({:?} interval, {:?} timeout)",
            market, self.config.pulse_interval, self.config.pulse_timeout
        );

        self.stats.cancelled_at_startup = self.sweep("startup").await;

        let mut ticker = tokio::time::interval(self.config.pulse_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_pulse().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("[{}] shutting down", market);
        self.stats.cancelled_at_shutdown = self.sweep("shutdown").await;

        info!(
            "[{}] scheduler stopped: {} pulses ({} completed, {} skipped, {} failed)",
            market,
            self.stats.pulses,
            self.stats.completed,
            self.stats.skipped,
            self.stats.failed
        );
        self.stats
    }

    async fn run_pulse(&mut self) {
        self.stats.pulses += 1;

        let state = match self.source.model_state().await {
            Ok(state) => state,
            Err(e) => {
                self.stats.failed += 1;
                self.market_maker.notify_failure(CycleError::Producer(e));
                return;
            }
        };

        match timeout(self.config.pulse_timeout, self.market_maker.pulse(&state)).await {
            Ok(PulseOutcome::Completed(_)) => self.stats.completed += 1,
            Ok(PulseOutcome::Skipped) => self.stats.skipped += 1,
            Ok(PulseOutcome::Failed(_)) => self.stats.failed += 1,
            Err(_) => {
                self.stats.failed += 1;
                self.stats.timed_out += 1;
                self.market_maker
                    .notify_failure(CycleError::Timeout(self.config.pulse_timeout));
            }
        }
    }

    async fn sweep(&mut self, stage: &str) -> usize {
        match timeout(self.config.pulse_timeout, self.market_maker.cancel_all()).await {
            Ok(Ok(cancelled)) => cancelled,
            Ok(Err(e)) => {
                warn!(
                    "[{}] {} cancel sweep failed: {}",
                    self.market_maker.market(),
                    stage,
                    e
                );
                0
            }
            Err(_) => {
                warn!(
                    "[{}] {} cancel sweep timed out",
                    self.market_maker.market(),
                    stage
                );
                0
            }
        }
    }
}
