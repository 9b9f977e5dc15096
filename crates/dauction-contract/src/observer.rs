//! Observability hook for round lifecycle events.
//!
//! The clearing and settlement code never logs. The contract reports what
//! happened to a [`ClearingObserver`] instead; [`TracingObserver`] turns
//! those reports into structured `tracing` events and [`NoopObserver`]
//! drops them.

use dauction_ledger::SettlementSummary;
use dauction_types::{AuctionError, Bid, BidSide, ClearingReceipt, RoundId};

/// Receives lifecycle events from the contract. Every method defaults to
/// doing nothing.
pub trait ClearingObserver {
    fn bid_accepted(&self, _round: &RoundId, _side: BidSide, _bid: &Bid) {}

    fn round_cleared(
        &self,
        _round: &RoundId,
        _receipt: &ClearingReceipt,
        _settlement: &SettlementSummary,
    ) {
    }

    /// A clear was requested on a round that already holds a receipt.
    fn clear_replayed(&self, _round: &RoundId, _receipt: &ClearingReceipt) {}

    fn clearing_failed(&self, _round: &RoundId, _error: &AuctionError) {}

    fn round_reset(&self, _round: &RoundId) {}

    fn round_closed(&self, _round: &RoundId) {}
}

/// Emits every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ClearingObserver for TracingObserver {
    fn bid_accepted(&self, round: &RoundId, side: BidSide, bid: &Bid) {
        tracing::debug!(
            round = %round,
            %side,
            participant = %bid.participant.short(),
            price = %bid.price,
            qty = bid.quantity,
            seq = bid.seq,
            "Bid accepted"
        );
    }

    fn round_cleared(
        &self,
        round: &RoundId,
        receipt: &ClearingReceipt,
        settlement: &SettlementSummary,
    ) {
        tracing::info!(
            round = %round,
            cleared_quantity = receipt.cleared_quantity,
            price = %receipt.cleared_price,
            rule = %receipt.rule,
            turnover = %settlement.debited,
            participants = settlement.participants,
            settlement_root = %receipt.settlement_root,
            "Round cleared"
        );
    }

    fn clear_replayed(&self, round: &RoundId, receipt: &ClearingReceipt) {
        tracing::debug!(
            round = %round,
            settlement_root = %receipt.settlement_root,
            "Round already cleared, returning stored receipt"
        );
    }

    fn clearing_failed(&self, round: &RoundId, error: &AuctionError) {
        tracing::warn!(round = %round, %error, "Clearing failed");
    }

    fn round_reset(&self, round: &RoundId) {
        tracing::info!(round = %round, "Round reset");
    }

    fn round_closed(&self, round: &RoundId) {
        tracing::info!(round = %round, "Round closed");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ClearingObserver for NoopObserver {}
