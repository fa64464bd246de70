//! Market making cycle errors

use std::time::Duration;

use thiserror::Error;
use tiller_ports::{ProducerError, RemoteError};

/// Anything that can abort a pulse
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Producer error: {0}")]
    Producer(#[from] ProducerError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] tiller_order_manager::Error),

    #[error("Pulse timed out after {0:?}")]
    Timeout(Duration),
}

impl CycleError {
    /// Failures the venue reported as temporary
    pub fn is_transient(&self) -> bool {
        matches!(self, CycleError::Remote(e) if e.is_transient())
    }
}
