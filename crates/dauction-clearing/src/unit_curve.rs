//! Stepped price curves indexed by unit.
//!
//! A bid of quantity `q` covers `q` consecutive units at its price, so the
//! demand and supply curves can be compared one unit at a time. Units are
//! never materialized: each curve keeps one step per bid with the
//! cumulative unit count at its end, and lookups are index arithmetic.
//! Side ordering is preserved: the demand curve is non-increasing, the
//! supply curve non-decreasing.

use dauction_types::{AuctionError, Bid, BidSide, Result};
use rust_decimal::Decimal;

/// One run of units at the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    price: Decimal,
    /// Cumulative unit count through this step (exclusive end index).
    end: u64,
}

/// One side of the book as a stepped function from unit index to price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCurve {
    /// Which side these units came from.
    pub side: BidSide,
    steps: Vec<Step>,
}

impl UnitCurve {
    /// Build the curve of sorted bids. Zero-quantity bids add no step.
    ///
    /// # Errors
    /// `InconsistentBook` if the side holds more than `u64::MAX` units.
    pub fn expand(side: BidSide, bids: &[Bid]) -> Result<Self> {
        let mut steps = Vec::with_capacity(bids.len());
        let mut end = 0u64;
        for bid in bids.iter().filter(|b| b.quantity > 0) {
            end = end.checked_add(bid.quantity).ok_or_else(|| {
                AuctionError::InconsistentBook {
                    reason: format!("{side} side holds more than {} units", u64::MAX),
                }
            })?;
            steps.push(Step {
                price: bid.price,
                end,
            });
        }
        Ok(Self { side, steps })
    }

    /// Number of units on the curve.
    #[must_use]
    pub fn units(&self) -> u64 {
        self.steps.last().map_or(0, |s| s.end)
    }

    /// Price of the highest-priority unit.
    #[must_use]
    pub fn first(&self) -> Option<Decimal> {
        self.steps.first().map(|s| s.price)
    }

    /// Price of the lowest-priority unit.
    #[must_use]
    pub fn last(&self) -> Option<Decimal> {
        self.steps.last().map(|s| s.price)
    }

    /// Price of unit `index`, or `None` past the end of the curve.
    #[must_use]
    pub fn price_at(&self, index: u64) -> Option<Decimal> {
        let pos = self.steps.partition_point(|s| s.end <= index);
        self.steps.get(pos).map(|s| s.price)
    }

    /// First unit index at which this curve is strictly below `other`,
    /// looking only at indices both curves cover.
    ///
    /// Walks both step lists together, so the cost is linear in bids,
    /// not in units.
    #[must_use]
    pub fn first_below(&self, other: &UnitCurve) -> Option<u64> {
        let (mut i, mut j) = (0, 0);
        let mut start = 0u64;
        while let (Some(mine), Some(theirs)) = (self.steps.get(i), other.steps.get(j)) {
            if mine.price < theirs.price {
                return Some(start);
            }
            start = mine.end.min(theirs.end);
            if mine.end == start {
                i += 1;
            }
            if theirs.end == start {
                j += 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn curve(side: BidSide, bids: &[(Decimal, u64)]) -> UnitCurve {
        let bids: Vec<Bid> = bids
            .iter()
            .zip(0..)
            .map(|(&(price, quantity), seq)| Bid::dummy("a", price, quantity, seq))
            .collect();
        UnitCurve::expand(side, &bids).unwrap()
    }

    #[test]
    fn unit_lookup_follows_quantities() {
        let c = curve(BidSide::Buy, &[(dec!(9), 3), (dec!(8), 2)]);
        let prices: Vec<Option<Decimal>> = (0..6).map(|i| c.price_at(i)).collect();
        assert_eq!(
            prices,
            vec![
                Some(dec!(9)),
                Some(dec!(9)),
                Some(dec!(9)),
                Some(dec!(8)),
                Some(dec!(8)),
                None
            ]
        );
        assert_eq!(c.first(), Some(dec!(9)));
        assert_eq!(c.last(), Some(dec!(8)));
        assert_eq!(c.units(), 5);
    }

    #[test]
    fn empty_curve() {
        let c = UnitCurve::expand(BidSide::Sell, &[]).unwrap();
        assert_eq!(c.units(), 0);
        assert_eq!(c.first(), None);
        assert_eq!(c.price_at(0), None);
    }

    #[test]
    fn zero_quantity_contributes_nothing() {
        let c = curve(BidSide::Sell, &[(dec!(5), 0), (dec!(6), 1)]);
        assert_eq!(c.first(), Some(dec!(6)));
        assert_eq!(c.units(), 1);
    }

    #[test]
    fn huge_quantities_stay_as_single_steps() {
        let c = curve(BidSide::Sell, &[(dec!(5), u64::MAX - 1), (dec!(6), 1)]);
        assert_eq!(c.units(), u64::MAX);
        assert_eq!(c.price_at(u64::MAX - 2), Some(dec!(5)));
        assert_eq!(c.price_at(u64::MAX - 1), Some(dec!(6)));
        assert_eq!(c.price_at(u64::MAX), None);
    }

    #[test]
    fn unit_count_overflow_is_inconsistent() {
        let bids = vec![
            Bid::dummy("a", dec!(5), u64::MAX, 0),
            Bid::dummy("b", dec!(6), 1, 1),
        ];
        let err = UnitCurve::expand(BidSide::Sell, &bids).unwrap_err();
        assert!(matches!(err, AuctionError::InconsistentBook { .. }));
    }

    #[test]
    fn first_below_matches_unit_by_unit_scan() {
        // Units: demand [10,10,8,8,8,5], supply [4,7,7,9,9].
        let demand = curve(BidSide::Buy, &[(dec!(10), 2), (dec!(8), 3), (dec!(5), 1)]);
        let supply = curve(BidSide::Sell, &[(dec!(4), 1), (dec!(7), 2), (dec!(9), 2)]);
        let scan = (0..demand.units().min(supply.units()))
            .find(|&i| demand.price_at(i) < supply.price_at(i));
        assert_eq!(scan, Some(3));
        assert_eq!(demand.first_below(&supply), scan);
    }

    #[test]
    fn first_below_agrees_with_unit_scan_on_random_curves() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..300 {
            let mut side = |desc: bool| {
                let mut steps: Vec<(Decimal, u64)> = (0..rng.gen_range(1..6))
                    .map(|_| (Decimal::from(rng.gen_range(1..12i64)), rng.gen_range(0..4)))
                    .collect();
                steps.sort_by(|a, b| if desc { b.0.cmp(&a.0) } else { a.0.cmp(&b.0) });
                steps
            };
            let demand = curve(BidSide::Buy, &side(true));
            let supply = curve(BidSide::Sell, &side(false));
            let scan = (0..demand.units().min(supply.units()))
                .find(|&i| demand.price_at(i) < supply.price_at(i));
            assert_eq!(demand.first_below(&supply), scan);
        }
    }

    #[test]
    fn first_below_none_when_curves_never_cross() {
        let demand = curve(BidSide::Buy, &[(dec!(9), 3), (dec!(8), 2)]);
        let supply = curve(BidSide::Sell, &[(dec!(5), 2), (dec!(7), 3)]);
        assert_eq!(demand.first_below(&supply), None);
    }
}
