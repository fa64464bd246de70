//! In-flight order tracking
//!
//! The remote order view lags behind submissions: an order placed in one pulse
//! may not be listed by the next fetch. Without compensation the next pulse
//! would see an empty side and place the same quote again.
//!
//! [`OrderTracker`] remembers every order the cycle submitted until the remote
//! view shows it, and merges those in-flight orders into the view handed to the
//! reconciler.
//!
//! An entry the remote view keeps missing (its submission failed, or it filled
//! before it ever showed up) is given up after `max_unconfirmed_pulses` views,
//! so the side it held can be quoted again.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use tiller_core::{ClientId, Order};

use crate::error::{Error, Result};

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum number of in-flight orders remembered. The oldest is evicted
    /// when a new one arrives at capacity.
    pub max_tracked: usize,
    /// Remote views an entry may be missing from before it is dropped. Must
    /// exceed the venue's visibility lag.
    pub max_unconfirmed_pulses: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_tracked: 64,
            max_unconfirmed_pulses: 3,
        }
    }
}

#[derive(Debug)]
struct TrackedOrder {
    order: Order,
    /// Consecutive remote views that did not list this order
    missed_views: usize,
}

/// Orders submitted by this process that the remote view has not shown yet
#[derive(Debug, Default)]
pub struct OrderTracker {
    config: TrackerConfig,
    orders: HashMap<ClientId, TrackedOrder>,
    /// Insertion order of `orders` keys
    sequence: VecDeque<ClientId>,
}

impl OrderTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            orders: HashMap::new(),
            sequence: VecDeque::new(),
        }
    }

    /// Remember an order about to be submitted
    ///
    /// The order must carry a client id that is not already tracked.
    pub fn track(&mut self, order: Order) -> Result<()> {
        let client_id = order.client_id.ok_or(Error::MissingClientId)?;
        if self.orders.contains_key(&client_id) {
            return Err(Error::DuplicateClientId(client_id));
        }

        let capacity = self.config.max_tracked.max(1);
        while self.orders.len() >= capacity {
            let Some(oldest) = self.sequence.pop_front() else {
                break;
            };
            if let Some(evicted) = self.orders.remove(&oldest) {
                warn!(
                    "Tracker full ({}), evicting oldest in-flight order {}",
                    capacity, evicted.order
                );
            }
        }

        debug!("Tracking {}", order);
        self.orders.insert(
            client_id,
            TrackedOrder {
                order,
                missed_views: 0,
            },
        );
        self.sequence.push_back(client_id);
        Ok(())
    }

    /// Merge the remote view with orders still in flight
    ///
    /// Returns every remote order (duplicates by client id, then exchange id,
    /// removed) followed by every tracked order whose client id the remote view
    /// does not contain, in the order they were tracked. Tracked orders the
    /// remote view does contain are forgotten, and so are orders it has now
    /// missed more than `max_unconfirmed_pulses` times.
    pub fn existing_orders(&mut self, remote: &[Order]) -> Vec<Order> {
        let mut seen_client_ids = HashSet::new();
        let mut seen_exchange_ids = HashSet::new();
        let mut existing = Vec::with_capacity(remote.len() + self.orders.len());

        for order in remote {
            if let Some(client_id) = order.client_id {
                if !seen_client_ids.insert(client_id) {
                    continue;
                }
            }
            if let Some(exchange_id) = order.exchange_order_id.as_deref() {
                if !seen_exchange_ids.insert(exchange_id) {
                    continue;
                }
            }
            existing.push(order.clone());
        }

        let max_missed = self.config.max_unconfirmed_pulses;
        let mut confirmed = 0;
        self.orders.retain(|id, tracked| {
            if seen_client_ids.contains(id) {
                confirmed += 1;
                return false;
            }
            tracked.missed_views += 1;
            if tracked.missed_views > max_missed {
                warn!(
                    "Giving up on {}: not seen in {} remote views",
                    tracked.order, tracked.missed_views
                );
                return false;
            }
            true
        });
        let orders = &self.orders;
        self.sequence.retain(|id| orders.contains_key(id));
        if confirmed > 0 {
            debug!("{} tracked order(s) now visible remotely", confirmed);
        }

        existing.extend(self.tracked_orders().cloned());
        existing
    }

    /// Forget a tracked order. Unknown ids are ignored.
    pub fn untrack(&mut self, client_id: ClientId) -> Option<Order> {
        let removed = self.orders.remove(&client_id)?.order;
        self.sequence.retain(|id| *id != client_id);
        debug!("Untracked {}", removed);
        Some(removed)
    }

    /// Draw a client id not currently tracked
    pub fn next_client_id<R: Rng>(&self, rng: &mut R) -> ClientId {
        loop {
            let candidate = ClientId::new(rng.r#gen());
            if !self.orders.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.orders.contains_key(&client_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Tracked orders, oldest first
    pub fn tracked_orders(&self) -> impl Iterator<Item = &Order> {
        self.sequence
            .iter()
            .filter_map(|id| self.orders.get(id))
            .map(|tracked| &tracked.order)
    }
}
