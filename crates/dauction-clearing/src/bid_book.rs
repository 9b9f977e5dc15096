//! The bid book for a single auction round.
//!
//! Two plain vectors, one per side, kept in price priority:
//! - **Buyers**: highest price first
//! - **Sellers**: lowest price first
//!
//! Equal prices are ordered by submission sequence, so the ordering is total
//! and every replica sorts identically. Settlement arrays downstream are
//! aligned to slot position in these vectors.

use dauction_types::{AccountLedger, AuctionError, Bid, BidSide, ParticipantId, Result};
use rust_decimal::Decimal;

/// Buyer and seller bid sequences for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidBook {
    /// Buy side: highest price first.
    buyers: Vec<Bid>,
    /// Sell side: lowest price first.
    sellers: Vec<Bid>,
    /// Sequence number handed to the next insertion.
    next_seq: u64,
    /// Optional cap on slots per side.
    max_bids_per_side: Option<usize>,
}

impl BidBook {
    /// Create a new empty, unbounded book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty book with a per-side slot cap.
    #[must_use]
    pub fn with_limit(max_bids_per_side: Option<usize>) -> Self {
        Self {
            max_bids_per_side,
            ..Self::default()
        }
    }

    /// Rebuild a book from persisted sequences.
    ///
    /// Sort order is re-established and `next_seq` is raised past every
    /// stored sequence, so a tampered or legacy record still yields a
    /// well-formed book.
    #[must_use]
    pub fn from_sides(mut buyers: Vec<Bid>, mut sellers: Vec<Bid>, next_seq: u64) -> Self {
        buyers.sort_by(|a, b| BidSide::Buy.priority(a, b));
        sellers.sort_by(|a, b| BidSide::Sell.priority(a, b));
        let max_seen = buyers
            .iter()
            .chain(&sellers)
            .map(|b| b.seq.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self {
            buyers,
            sellers,
            next_seq: next_seq.max(max_seen),
            max_bids_per_side: None,
        }
    }

    /// Set or lift the per-side slot cap.
    pub fn set_limit(&mut self, max_bids_per_side: Option<usize>) {
        self.max_bids_per_side = max_bids_per_side;
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Insert a bid for a registered participant and restore sort order.
    ///
    /// Returns the sequence number assigned to the new bid.
    ///
    /// # Errors
    /// - `NotRegistered` if `ledger` has no account for `participant`
    /// - `MalformedInput` for a non-positive price or zero quantity
    /// - `BookFull` if the side is at its configured cap
    pub fn insert<L: AccountLedger + ?Sized>(
        &mut self,
        ledger: &L,
        side: BidSide,
        participant: ParticipantId,
        price: Decimal,
        quantity: u64,
    ) -> Result<u64> {
        if !ledger.contains(&participant) {
            return Err(AuctionError::NotRegistered(participant));
        }
        if let Some(limit) = self.max_bids_per_side {
            if self.side(side).len() >= limit {
                return Err(AuctionError::BookFull { side, limit });
            }
        }

        let seq = self.next_seq;
        let next_seq = seq.checked_add(1).ok_or_else(|| AuctionError::InconsistentBook {
            reason: "bid sequence numbers exhausted".into(),
        })?;
        let bid = Bid::new(participant, price, quantity, seq)?;
        self.next_seq = next_seq;

        let bids = self.side_mut(side);
        bids.push(bid);
        bids.sort_by(|a, b| side.priority(a, b));
        Ok(seq)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Buy side in priority order.
    #[must_use]
    pub fn buyers(&self) -> &[Bid] {
        &self.buyers
    }

    /// Sell side in priority order.
    #[must_use]
    pub fn sellers(&self) -> &[Bid] {
        &self.sellers
    }

    #[must_use]
    pub fn side(&self, side: BidSide) -> &[Bid] {
        match side {
            BidSide::Buy => &self.buyers,
            BidSide::Sell => &self.sellers,
        }
    }

    fn side_mut(&mut self, side: BidSide) -> &mut Vec<Bid> {
        match side {
            BidSide::Buy => &mut self.buyers,
            BidSide::Sell => &mut self.sellers,
        }
    }

    /// Sum of quantities on one side.
    #[must_use]
    pub fn total_units(&self, side: BidSide) -> u64 {
        self.side(side)
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.quantity))
    }

    /// Total number of bid slots in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buyers.len() + self.sellers.len()
    }

    /// Returns `true` if the book has no bids on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buyers.is_empty() && self.sellers.is_empty()
    }

    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Whether both sides satisfy the price-priority invariant.
    #[must_use]
    pub fn is_price_sorted(&self) -> bool {
        is_sorted_for(BidSide::Buy, &self.buyers) && is_sorted_for(BidSide::Sell, &self.sellers)
    }

    // =================================================================
    // Maintenance
    // =================================================================

    /// Drop every bid and restart sequencing (used by round reset).
    pub fn clear(&mut self) {
        self.buyers.clear();
        self.sellers.clear();
        self.next_seq = 0;
    }

    /// Hand the sequences back for persistence.
    #[must_use]
    pub fn into_sides(self) -> (Vec<Bid>, Vec<Bid>, u64) {
        (self.buyers, self.sellers, self.next_seq)
    }
}

/// Whether `bids` is in non-decreasing priority order for `side`.
#[must_use]
pub fn is_sorted_for(side: BidSide, bids: &[Bid]) -> bool {
    bids.windows(2)
        .all(|w| side.priority(&w[0], &w[1]) != std::cmp::Ordering::Greater)
}
