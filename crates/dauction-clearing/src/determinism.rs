//! Determinism verification utilities for cross-replica consistency.
//!
//! Every replica clearing the same round must produce the exact same
//! outcome and settlement. The `settlement_root` is a SHA-256 commitment
//! over the book, the outcome and the per-slot amounts, so replicas can
//! compare 32 bytes instead of full payloads.

use dauction_types::{Bid, ClearingOutcome, constants};
use sha2::{Digest, Sha256};

use crate::{Allocation, BidBook};

/// Compute the settlement root over a cleared book.
///
/// Depends on, in order:
/// - every buyer then seller slot (participant, price, quantity, seq)
/// - cleared quantity, cleared price and the deciding rule
/// - every buyer payment then seller receipt
///
/// Decimals are hashed through their normalized string form so that `7`
/// and `7.00` commit identically.
#[must_use]
pub fn compute_settlement_root(
    book: &BidBook,
    outcome: &ClearingOutcome,
    allocation: &Allocation,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::SETTLEMENT_ROOT_DOMAIN);

    hash_side(&mut hasher, book.buyers());
    hash_side(&mut hasher, book.sellers());

    hasher.update(outcome.cleared_quantity.to_le_bytes());
    hasher.update(outcome.cleared_price.normalize().to_string().as_bytes());
    hasher.update(outcome.rule.to_string().as_bytes());

    for amount in allocation.buyers_pay.iter().chain(&allocation.sellers_receive) {
        hasher.update(amount.normalize().to_string().as_bytes());
        hasher.update(b";");
    }

    hasher.finalize().into()
}

fn hash_side(hasher: &mut Sha256, bids: &[Bid]) {
    hasher.update((bids.len() as u64).to_le_bytes());
    for bid in bids {
        hasher.update(bid.participant.as_str().as_bytes());
        hasher.update(bid.price.normalize().to_string().as_bytes());
        hasher.update(b";");
        hasher.update(bid.quantity.to_le_bytes());
        hasher.update(bid.seq.to_le_bytes());
    }
}

/// Hex form of [`compute_settlement_root`], as stored on receipts.
#[must_use]
pub fn settlement_root_hex(
    book: &BidBook,
    outcome: &ClearingOutcome,
    allocation: &Allocation,
) -> String {
    hex::encode(compute_settlement_root(book, outcome, allocation))
}

/// Verify that a stored root matches the recomputed one.
#[must_use]
pub fn verify_settlement_root(
    book: &BidBook,
    outcome: &ClearingOutcome,
    allocation: &Allocation,
    expected_hex: &str,
) -> bool {
    settlement_root_hex(book, outcome, allocation) == expected_hex
}
