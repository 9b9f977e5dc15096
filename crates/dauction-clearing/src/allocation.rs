//! Settlement allocation.
//!
//! Distributes the cleared quantity across bid slots in price priority:
//! walking one side in stored order, each slot fills until the cleared
//! quantity is used up. A slot pays (buyers) or receives (sellers)
//! `cleared_price × filled_units`. The straddling slot fills partially and
//! every later slot fills nothing.
//!
//! Output vectors are aligned to slot position in the book, not to
//! participants: one participant with two slots gets two entries.
//!
//! Amounts use checked arithmetic; an out-of-range product or total is an
//! `ArithmeticOverflow` error, never a panic.

use dauction_types::amount::{checked_total, value_of};
use dauction_types::{Bid, ClearingOutcome, Result};
use rust_decimal::Decimal;

use crate::BidBook;

/// Per-slot settlement amounts for one clearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Amount each buyer slot pays, aligned to `BidBook::buyers()`.
    pub buyers_pay: Vec<Decimal>,
    /// Amount each seller slot receives, aligned to `BidBook::sellers()`.
    pub sellers_receive: Vec<Decimal>,
    /// Units filled per buyer slot.
    pub buyers_filled: Vec<u64>,
    /// Units filled per seller slot.
    pub sellers_filled: Vec<u64>,
}

impl Allocation {
    /// Sum paid by all buyers.
    pub fn total_paid(&self) -> Result<Decimal> {
        checked_total(&self.buyers_pay)
    }

    /// Sum received by all sellers.
    pub fn total_received(&self) -> Result<Decimal> {
        checked_total(&self.sellers_receive)
    }
}

/// Allocate a clearing outcome over a book.
pub fn allocate_book(outcome: &ClearingOutcome, book: &BidBook) -> Result<Allocation> {
    allocate(
        outcome.cleared_quantity,
        outcome.cleared_price,
        book.buyers(),
        book.sellers(),
    )
}

/// Compute per-slot payments (buyers) and receipts (sellers).
///
/// # Errors
/// `ArithmeticOverflow` if `cleared_price × units` is out of range for any
/// slot.
pub fn allocate(
    cleared_quantity: u64,
    cleared_price: Decimal,
    buyers: &[Bid],
    sellers: &[Bid],
) -> Result<Allocation> {
    let buyers_filled = fill_in_priority(cleared_quantity, buyers);
    let sellers_filled = fill_in_priority(cleared_quantity, sellers);
    let value = |units: &u64| value_of(cleared_price, *units);
    Ok(Allocation {
        buyers_pay: buyers_filled.iter().map(value).collect::<Result<_>>()?,
        sellers_receive: sellers_filled.iter().map(value).collect::<Result<_>>()?,
        buyers_filled,
        sellers_filled,
    })
}

/// Units each slot fills when `cleared_quantity` is consumed in order.
fn fill_in_priority(cleared_quantity: u64, bids: &[Bid]) -> Vec<u64> {
    let mut remaining = cleared_quantity;
    bids.iter()
        .map(|bid| {
            let take = bid.quantity.min(remaining);
            remaining -= take;
            take
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use dauction_types::AuctionError;
    use rust_decimal_macros::dec;

    use super::*;

    fn buyers() -> Vec<Bid> {
        vec![
            Bid::dummy("a", dec!(9), 3, 0),
            Bid::dummy("c", dec!(8), 2, 1),
            Bid::dummy("e", dec!(4), 4, 2),
        ]
    }

    fn sellers() -> Vec<Bid> {
        vec![Bid::dummy("b", dec!(5), 2, 3), Bid::dummy("d", dec!(7), 3, 4)]
    }

    #[test]
    fn fully_inside_slots_pay_full_notional() {
        let alloc = allocate(5, dec!(7), &buyers(), &sellers()).unwrap();
        assert_eq!(alloc.buyers_pay, vec![dec!(21), dec!(14), dec!(0)]);
        assert_eq!(alloc.sellers_receive, vec![dec!(14), dec!(21)]);
        assert_eq!(alloc.buyers_filled, vec![3, 2, 0]);
        assert_eq!(alloc.total_paid().unwrap(), dec!(35));
        assert_eq!(alloc.total_received().unwrap(), dec!(35));
    }

    #[test]
    fn straddling_slot_pays_units_up_to_boundary() {
        let alloc = allocate(4, dec!(7.5), &buyers(), &sellers()).unwrap();
        // Buyer a fills 3, buyer c fills 1 of 2.
        assert_eq!(alloc.buyers_filled, vec![3, 1, 0]);
        assert_eq!(alloc.buyers_pay, vec![dec!(22.5), dec!(7.5), dec!(0)]);
        // Seller b fills 2, seller d fills 2 of 3.
        assert_eq!(alloc.sellers_filled, vec![2, 2]);
        assert_eq!(alloc.sellers_receive, vec![dec!(15), dec!(15)]);
        assert_eq!(alloc.total_paid().unwrap(), dec!(30));
        assert_eq!(alloc.total_received().unwrap(), dec!(30));
    }

    #[test]
    fn zero_quantity_pays_nothing() {
        let alloc = allocate(0, dec!(5.5), &buyers(), &sellers()).unwrap();
        assert!(alloc.buyers_pay.iter().all(Decimal::is_zero));
        assert!(alloc.sellers_receive.iter().all(Decimal::is_zero));
        assert_eq!(alloc.buyers_pay.len(), 3);
        assert_eq!(alloc.sellers_receive.len(), 2);
    }

    #[test]
    fn outputs_align_to_slots_not_participants() {
        let buyers = vec![Bid::dummy("a", dec!(9), 1, 0), Bid::dummy("a", dec!(8), 1, 1)];
        let sellers = vec![Bid::dummy("b", dec!(5), 2, 2)];
        let alloc = allocate(2, dec!(8), &buyers, &sellers).unwrap();
        assert_eq!(alloc.buyers_pay, vec![dec!(8), dec!(8)]);
        assert_eq!(alloc.sellers_receive, vec![dec!(16)]);
    }

    #[test]
    fn out_of_range_payment_is_an_error() {
        // Top buyer at the maximum price takes both seller units.
        let buyers = vec![Bid::dummy("a", Decimal::MAX, 3, 0)];
        let sellers = vec![Bid::dummy("b", dec!(1), 2, 1)];
        let err = allocate(2, Decimal::MAX, &buyers, &sellers).unwrap_err();
        assert!(matches!(err, AuctionError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn out_of_range_total_is_an_error() {
        let buyers = vec![
            Bid::dummy("a", Decimal::MAX, 1, 0),
            Bid::dummy("c", Decimal::MAX, 1, 1),
        ];
        let sellers = vec![Bid::dummy("b", dec!(1), 1, 2), Bid::dummy("d", dec!(1), 1, 3)];
        let alloc = allocate(2, Decimal::MAX, &buyers, &sellers).unwrap();
        assert!(alloc.total_paid().is_err());
        assert!(alloc.total_received().is_err());
    }
}
