use serde::{Deserialize, Serialize};
use tiller_core::Order;

/// A single remote instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Cancel { order: Order, ok_if_missing: bool },
    Place(Order),
    /// Process the market's pending fill events
    Crank,
    /// Move filled proceeds back into the account
    Settle,
    /// Claim accrued liquidity incentives
    Redeem,
}

impl Operation {
    pub fn is_settlement(&self) -> bool {
        matches!(self, Operation::Settle | Operation::Redeem)
    }
}

/// Builder for one atomic submission
///
/// Operations come out cancels first, then places, then cranks, then
/// settlement, whatever order they were added in. Within each group insertion
/// order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationBatch {
    cancels: Vec<Operation>,
    places: Vec<Operation>,
    cranks: Vec<Operation>,
    settlements: Vec<Operation>,
}

impl OperationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&mut self, order: Order, ok_if_missing: bool) -> &mut Self {
        self.cancels.push(Operation::Cancel {
            order,
            ok_if_missing,
        });
        self
    }

    pub fn place(&mut self, order: Order) -> &mut Self {
        self.places.push(Operation::Place(order));
        self
    }

    pub fn crank(&mut self) -> &mut Self {
        self.cranks.push(Operation::Crank);
        self
    }

    pub fn settle(&mut self) -> &mut Self {
        self.settlements.push(Operation::Settle);
        self
    }

    pub fn redeem(&mut self) -> &mut Self {
        self.settlements.push(Operation::Redeem);
        self
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.len()
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn crank_count(&self) -> usize {
        self.cranks.len()
    }

    pub fn settlement_count(&self) -> usize {
        self.settlements.len()
    }

    pub fn len(&self) -> usize {
        self.cancels.len() + self.places.len() + self.cranks.len() + self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Operations in submission order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.cancels
            .iter()
            .chain(self.places.iter())
            .chain(self.cranks.iter())
            .chain(self.settlements.iter())
    }

    pub fn into_operations(self) -> Vec<Operation> {
        let mut ops = self.cancels;
        ops.extend(self.places);
        ops.extend(self.cranks);
        ops.extend(self.settlements);
        ops
    }
}

/// Acknowledgement of an applied batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Remote transaction id
    pub signature: String,
    pub cancelled: usize,
    pub placed: usize,
    pub cranked: usize,
    pub settled: usize,
}
