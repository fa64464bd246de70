//! Bounded pause-then-retry execution
//!
//! A [`RetryPolicy`] is a name plus a list of pauses. A policy with N pauses
//! attempts the operation at most N times. After failed attempt `k` (with
//! `k < N`) it sleeps `pauses[k - 1]` and tries again; the error of attempt N
//! is returned unchanged. Errors are never inspected, so callers that must not
//! retry some failures should return those as a successful value (see the
//! runner's batch submission).
//!
//! ```text
//! attempt 1 ──fail──► sleep p[0] ──► attempt 2 ──fail──► sleep p[1] ──► ... attempt N ──fail──► Err
//!     │                                  │                                    │
//!     └──ok──► Ok                        └──ok──► Ok                          └──ok──► Ok
//! ```
//!
//! Policies are built per call-site and consumed by [`RetryPolicy::run`].

use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::error::{GatewayError, Result};

/// Progress of a single `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    NotStarted,
    Attempting(usize),
    Succeeded,
    Exhausted,
}

/// Bounded retry with explicit pauses between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    name: String,
    pauses: Vec<Duration>,
}

impl RetryPolicy {
    /// Create a policy attempting once per pause
    ///
    /// An empty pause list would allow zero attempts and is rejected.
    pub fn new(name: impl Into<String>, pauses: Vec<Duration>) -> Result<Self> {
        let name = name.into();
        if pauses.is_empty() {
            return Err(GatewayError::InvalidRetryPolicy(format!(
                "{}: at least one pause is required",
                name
            )));
        }
        Ok(Self { name, pauses })
    }

    /// `attempts` tries separated by the same pause
    pub fn fixed(name: impl Into<String>, attempts: usize, pause: Duration) -> Result<Self> {
        Self::new(name, vec![pause; attempts])
    }

    /// `attempts` tries with a pause doubling from `initial` up to `cap`
    pub fn exponential(
        name: impl Into<String>,
        attempts: usize,
        initial: Duration,
        cap: Duration,
    ) -> Result<Self> {
        let mut pauses = Vec::with_capacity(attempts);
        let mut pause = initial.min(cap);
        for _ in 0..attempts {
            pauses.push(pause);
            pause = pause.saturating_mul(2).min(cap);
        }
        Self::new(name, pauses)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of times `run` invokes the operation
    pub fn attempts(&self) -> usize {
        self.pauses.len()
    }

    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }

    /// Run `operation` until it succeeds or the attempts are used up
    pub async fn run<T, E, F, Fut>(self, mut operation: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let total = self.pauses.len();
        let mut state = RetryState::NotStarted;
        let mut attempt = 1;

        loop {
            self.transition(&mut state, RetryState::Attempting(attempt));

            match operation().await {
                Ok(value) => {
                    self.transition(&mut state, RetryState::Succeeded);
                    return Ok(value);
                }
                Err(e) if attempt >= total => {
                    self.transition(&mut state, RetryState::Exhausted);
                    warn!(
                        "[{}] giving up after {} attempt(s): {}",
                        self.name, attempt, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    let pause = self.pauses[attempt - 1];
                    debug!(
                        "[{}] attempt {}/{} failed, retrying in {:?}: {}",
                        self.name, attempt, total, pause, e
                    );
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
            }
        }
    }

    fn transition(&self, state: &mut RetryState, next: RetryState) {
        debug!("[{}] {:?} -> {:?}", self.name, state, next);
        *state = next;
    }
}
