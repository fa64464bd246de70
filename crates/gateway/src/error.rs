//! Error types for the gateway crate

use thiserror::Error;
use tiller_ports::RemoteError;

/// Gateway-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
