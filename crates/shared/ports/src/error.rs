use thiserror::Error;

/// Errors reported by the remote order book or executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network hiccup, timeout, rate limit. Worth retrying.
    #[error("Transient remote failure: {0}")]
    Transient(String),

    /// The remote system refused the request (bad price, insufficient funds...)
    #[error("Rejected by remote: {0}")]
    Rejected(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Some operations in a batch applied and some did not
    #[error("Partial failure: {0}")]
    PartialFailure(String),
}

impl RemoteError {
    /// Whether retrying the same request can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transient(_))
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Errors raised while computing desired orders
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    #[error("Missing model data: {0}")]
    MissingData(String),

    #[error("Invalid model state: {0}")]
    InvalidState(String),
}

pub type ProducerResult<T> = std::result::Result<T, ProducerError>;
