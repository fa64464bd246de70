//! Desired-vs-existing order reconciliation
//!
//! Given the orders believed to be on the book and the orders the strategy
//! wants, decide which to cancel and which to place. Orders that are close
//! enough to a desired order are left alone, saving a cancel/place round trip
//! and the queue position that goes with it.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tiller_core::Order;

/// Outcome of one reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    /// Existing orders with no acceptable desired counterpart
    pub to_cancel: Vec<Order>,
    /// Desired orders with no acceptable existing counterpart
    pub to_place: Vec<Order>,
}

impl ReconciliationResult {
    /// True when the book already matches the desired orders
    pub fn is_empty(&self) -> bool {
        self.to_cancel.is_empty() && self.to_place.is_empty()
    }

    pub fn action_count(&self) -> usize {
        self.to_cancel.len() + self.to_place.len()
    }
}

/// Strategy for diffing existing orders against desired ones
pub trait OrderReconciler: Send + Sync {
    fn reconcile(&self, existing: &[Order], desired: &[Order]) -> ReconciliationResult;

    fn name(&self) -> &str;
}

/// Keeps existing orders within a relative tolerance of a desired order
///
/// An existing order is equivalent to a desired order on the same side when
/// both its price and its size are within `tolerance × |desired|` of the
/// desired values. Each order is used in at most one pair. Candidate pairs are
/// accepted by ascending relative distance, ties going to the earlier existing
/// order and then the earlier desired order.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceReconciler {
    tolerance: Decimal,
}

impl ToleranceReconciler {
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    fn within(&self, value: Decimal, target: Decimal) -> bool {
        (value - target).abs() <= self.tolerance * target.abs()
    }

    fn equivalent(&self, existing: &Order, desired: &Order) -> bool {
        existing.side == desired.side
            && self.within(existing.price, desired.price)
            && self.within(existing.quantity, desired.quantity)
    }

    /// Relative distance of a pair; lower is a better match
    fn score(existing: &Order, desired: &Order) -> Decimal {
        relative_distance(existing.price, desired.price)
            + relative_distance(existing.quantity, desired.quantity)
    }
}

impl Default for ToleranceReconciler {
    fn default() -> Self {
        Self::new(dec!(0.001))
    }
}

fn relative_distance(value: Decimal, target: Decimal) -> Decimal {
    if target.is_zero() {
        // Only an exact match is within tolerance of zero
        return Decimal::ZERO;
    }
    (value - target).abs() / target.abs()
}

impl OrderReconciler for ToleranceReconciler {
    fn reconcile(&self, existing: &[Order], desired: &[Order]) -> ReconciliationResult {
        let mut candidates: Vec<(Decimal, usize, usize)> = Vec::new();
        for (ei, e) in existing.iter().enumerate() {
            for (di, d) in desired.iter().enumerate() {
                if self.equivalent(e, d) {
                    candidates.push((Self::score(e, d), ei, di));
                }
            }
        }
        candidates.sort();

        let mut existing_matched = vec![false; existing.len()];
        let mut desired_matched = vec![false; desired.len()];
        for (_, ei, di) in candidates {
            if existing_matched[ei] || desired_matched[di] {
                continue;
            }
            existing_matched[ei] = true;
            desired_matched[di] = true;
            debug!("Keeping {} for desired {}", existing[ei], desired[di]);
        }

        let to_cancel = existing
            .iter()
            .zip(&existing_matched)
            .filter(|(_, matched)| !**matched)
            .map(|(order, _)| order.clone())
            .collect();
        let to_place = desired
            .iter()
            .zip(&desired_matched)
            .filter(|(_, matched)| !**matched)
            .map(|(order, _)| order.clone())
            .collect();

        ReconciliationResult {
            to_cancel,
            to_place,
        }
    }

    fn name(&self) -> &str {
        "ToleranceReconciler"
    }
}

/// Cancels everything and places everything, every time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceAllReconciler;

impl OrderReconciler for ReplaceAllReconciler {
    fn reconcile(&self, existing: &[Order], desired: &[Order]) -> ReconciliationResult {
        ReconciliationResult {
            to_cancel: existing.to_vec(),
            to_place: desired.to_vec(),
        }
    }

    fn name(&self) -> &str {
        "ReplaceAllReconciler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiller_core::Side;

    fn reconciler() -> ToleranceReconciler {
        ToleranceReconciler::new(dec!(0.01))
    }

    #[test]
    fn test_within_tolerance_is_noop() {
        let existing = vec![
            Order::buy(dec!(99.5), dec!(1.005)),
            Order::sell(dec!(100.5), dec!(1)),
        ];
        let desired = vec![Order::buy(dec!(100), dec!(1)), Order::sell(dec!(100), dec!(1))];

        let result = reconciler().reconcile(&existing, &desired);
        assert!(result.is_empty());
        assert_eq!(result.action_count(), 0);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let existing = vec![Order::buy(dec!(101), dec!(1))];
        let desired = vec![Order::buy(dec!(100), dec!(1))];
        assert!(reconciler().reconcile(&existing, &desired).is_empty());

        let existing = vec![Order::buy(dec!(101.01), dec!(1))];
        let result = reconciler().reconcile(&existing, &desired);
        assert_eq!(result.to_cancel, existing);
        assert_eq!(result.to_place, desired);
    }

    #[test]
    fn test_price_and_size_must_both_hold() {
        let existing = vec![Order::buy(dec!(100), dec!(1.5))];
        let desired = vec![Order::buy(dec!(100), dec!(1))];

        let result = reconciler().reconcile(&existing, &desired);
        assert_eq!(result.to_cancel.len(), 1);
        assert_eq!(result.to_place.len(), 1);
    }

    #[test]
    fn test_never_matches_across_sides() {
        let existing = vec![Order::sell(dec!(100), dec!(1))];
        let desired = vec![Order::buy(dec!(100), dec!(1))];

        let result = reconciler().reconcile(&existing, &desired);
        assert_eq!(result.to_cancel[0].side, Side::Sell);
        assert_eq!(result.to_place[0].side, Side::Buy);
    }

    #[test]
    fn test_empty_desired_cancels_all() {
        let existing = vec![Order::buy(dec!(99), dec!(1)), Order::sell(dec!(101), dec!(1))];
        let result = reconciler().reconcile(&existing, &[]);
        assert_eq!(result.to_cancel, existing);
        assert!(result.to_place.is_empty());
    }

    #[test]
    fn test_empty_existing_places_all() {
        let desired = vec![Order::buy(dec!(99), dec!(1)), Order::sell(dec!(101), dec!(1))];
        let result = reconciler().reconcile(&[], &desired);
        assert!(result.to_cancel.is_empty());
        assert_eq!(result.to_place, desired);
    }

    #[test]
    fn test_one_to_one_matching() {
        // Two existing orders both within tolerance of a single desired order
        let existing = vec![Order::buy(dec!(99.9), dec!(1)), Order::buy(dec!(100.1), dec!(1))];
        let desired = vec![Order::buy(dec!(100), dec!(1))];

        let result = reconciler().reconcile(&existing, &desired);
        assert_eq!(result.to_cancel.len(), 1);
        assert!(result.to_place.is_empty());
        // Equal distance: the earlier existing order is kept
        assert_eq!(result.to_cancel[0].price, dec!(100.1));
    }

    #[test]
    fn test_closest_pair_wins() {
        let existing = vec![Order::buy(dec!(99.5), dec!(1)), Order::buy(dec!(100), dec!(1))];
        let desired = vec![Order::buy(dec!(100), dec!(1)), Order::buy(dec!(99), dec!(1))];

        // (e1, d0) is exact; e0 then pairs with d1 (0.5% off)
        let result = reconciler().reconcile(&existing, &desired);
        assert!(result.is_empty());
    }

    #[test]
    fn test_unmatched_appear_exactly_once_in_input_order() {
        let existing = vec![
            Order::sell(dec!(110), dec!(1)),
            Order::buy(dec!(100), dec!(1)),
            Order::buy(dec!(90), dec!(1)),
        ];
        let desired = vec![
            Order::buy(dec!(80), dec!(1)),
            Order::buy(dec!(100), dec!(1)),
            Order::sell(dec!(120), dec!(1)),
        ];

        let result = reconciler().reconcile(&existing, &desired);
        let cancel_prices: Vec<_> = result.to_cancel.iter().map(|o| o.price).collect();
        let place_prices: Vec<_> = result.to_place.iter().map(|o| o.price).collect();
        assert_eq!(cancel_prices, vec![dec!(110), dec!(90)]);
        assert_eq!(place_prices, vec![dec!(80), dec!(120)]);
    }

    #[test]
    fn test_zero_tolerance_requires_exact_match() {
        let exact = ToleranceReconciler::new(Decimal::ZERO);
        let existing = vec![Order::buy(dec!(100), dec!(1))];

        assert!(exact.reconcile(&existing, &[Order::buy(dec!(100), dec!(1))]).is_empty());
        assert_eq!(
            exact
                .reconcile(&existing, &[Order::buy(dec!(100.0001), dec!(1))])
                .action_count(),
            2
        );
    }

    #[test]
    fn test_replace_all() {
        let existing = vec![Order::buy(dec!(100), dec!(1))];
        let desired = vec![Order::buy(dec!(100), dec!(1))];

        let result = ReplaceAllReconciler.reconcile(&existing, &desired);
        assert_eq!(result.to_cancel, existing);
        assert_eq!(result.to_place, desired);
        assert_eq!(ReplaceAllReconciler.name(), "ReplaceAllReconciler");
    }
}
