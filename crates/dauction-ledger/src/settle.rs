//! All-or-nothing settlement.
//!
//! Applying a clearing to the ledger runs in three phases:
//! 1. Check every bid's participant is registered
//! 2. Apply one delta per bid slot to a staged copy of the ledger
//!    (buyers negative, sellers positive)
//! 3. Verify supply conservation over the touched accounts
//!
//! Only when all three pass is the staged ledger committed. On any error,
//! including a balance pushed out of the `Decimal` range, the caller's
//! ledger is exactly as it was.

use std::collections::BTreeSet;

use dauction_clearing::{Allocation, BidBook};
use dauction_types::{AccountLedger, AuctionError, Bid, BidSide, ParticipantId, Result};
use rust_decimal::Decimal;

use crate::supply_conservation::SupplyConservation;

/// What a committed settlement moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementSummary {
    /// Total debited from buyers.
    pub debited: Decimal,
    /// Total credited to sellers.
    pub credited: Decimal,
    /// Number of deltas applied (one per bid slot).
    pub deltas_applied: usize,
    /// Distinct participants touched.
    pub participants: usize,
}

/// Apply an allocation to a ledger atomically.
///
/// # Errors
/// - `Internal` if the allocation is not aligned to the book's slots
/// - `NotRegistered` if any bid's participant has no account
/// - `SupplyInvariantViolation` if the staged balances don't conserve supply
/// - `ArithmeticOverflow` if a balance or total leaves the `Decimal` range
pub fn settle<L>(ledger: &mut L, book: &BidBook, allocation: &Allocation) -> Result<SettlementSummary>
where
    L: AccountLedger + Clone,
{
    if allocation.buyers_pay.len() != book.buyers().len()
        || allocation.sellers_receive.len() != book.sellers().len()
    {
        return Err(AuctionError::Internal(format!(
            "allocation covers {}/{} slots, book holds {}/{}",
            allocation.buyers_pay.len(),
            allocation.sellers_receive.len(),
            book.buyers().len(),
            book.sellers().len()
        )));
    }

    // 1. Registration
    let touched: BTreeSet<&ParticipantId> = book
        .buyers()
        .iter()
        .chain(book.sellers())
        .map(|bid| &bid.participant)
        .collect();
    let conservation = SupplyConservation::snapshot(ledger, touched.iter().copied())?;
    let debited = allocation.total_paid()?;
    let credited = allocation.total_received()?;

    // 2. Stage
    let mut staged = ledger.clone();
    let mut deltas_applied = 0;
    deltas_applied += apply_side(&mut staged, BidSide::Buy, book.buyers(), &allocation.buyers_pay)?;
    deltas_applied += apply_side(
        &mut staged,
        BidSide::Sell,
        book.sellers(),
        &allocation.sellers_receive,
    )?;

    // 3. Conservation
    conservation.verify(&staged)?;

    *ledger = staged;
    Ok(SettlementSummary {
        debited,
        credited,
        deltas_applied,
        participants: touched.len(),
    })
}

fn apply_side<L: AccountLedger>(
    ledger: &mut L,
    side: BidSide,
    bids: &[Bid],
    amounts: &[Decimal],
) -> Result<usize> {
    for (bid, amount) in bids.iter().zip(amounts) {
        ledger.apply_delta(&bid.participant, side.delta_sign() * *amount)?;
    }
    Ok(bids.len())
}
