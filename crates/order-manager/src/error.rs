//! Order Manager errors

use thiserror::Error;
use tiller_core::ClientId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Order has no client id and cannot be tracked")]
    MissingClientId,

    #[error("Client id {0} is already tracked")]
    DuplicateClientId(ClientId),
}

pub type Result<T> = std::result::Result<T, Error>;
