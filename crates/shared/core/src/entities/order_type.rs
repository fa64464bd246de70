use serde::{Deserialize, Serialize};

/// Order types a quote can be placed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Rests on the book, may take liquidity on entry
    Limit,
    /// Rests on the book, rejected if it would take liquidity
    #[default]
    PostOnly,
    /// Takes what it can, remainder is cancelled
    ImmediateOrCancel,
}
