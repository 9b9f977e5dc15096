//! Round lifecycle types for the Dauction double auction.
//!
//! A round is created open, collects bids, is cleared once (which closes
//! it), and can be reset to host a new trading period under the same id.
//!
//! The clearing algorithm recognises a fixed set of demand/supply crossing
//! shapes; [`ClearingRule`] names the one that produced a given outcome.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Bid, Result};

// ---------------------------------------------------------------------------
// ClearingRule: which crossing shape decided the price
// ---------------------------------------------------------------------------

/// The branch of the clearing ladder that produced an outcome.
///
/// Persisted and displayed under the same `SCREAMING_SNAKE_CASE` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClearingRule {
    /// Best buyer is below best seller; nothing trades.
    NoTrade,
    /// Top buyer wants more than all supply and outbids every seller.
    DemandConstrained,
    /// Top buyer wants exactly all supply and outbids every seller.
    TopBuyerTakesSupply,
    /// Crossing where the seller curve is flat across the crossing unit.
    FlatSupplyStep,
    /// Crossing where the seller step straddles the buyer step.
    SupplyStepInside,
    /// Crossing where the buyer curve is flat across the crossing unit.
    FlatDemandStep,
    /// Crossing where the buyer step straddles the seller step.
    DemandStepInside,
    /// Crossing through a gap between curves; midpoint of the last match.
    GapMidpoint,
    /// Last matched unit had buyer and seller at the same price.
    TouchingLastMatch,
    /// Curves never cross and end at the same price.
    EqualTail,
    /// Curves never cross; the shorter side is exhausted.
    NoCrossing,
}

impl fmt::Display for ClearingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoTrade => "NO_TRADE",
            Self::DemandConstrained => "DEMAND_CONSTRAINED",
            Self::TopBuyerTakesSupply => "TOP_BUYER_TAKES_SUPPLY",
            Self::FlatSupplyStep => "FLAT_SUPPLY_STEP",
            Self::SupplyStepInside => "SUPPLY_STEP_INSIDE",
            Self::FlatDemandStep => "FLAT_DEMAND_STEP",
            Self::DemandStepInside => "DEMAND_STEP_INSIDE",
            Self::GapMidpoint => "GAP_MIDPOINT",
            Self::TouchingLastMatch => "TOUCHING_LAST_MATCH",
            Self::EqualTail => "EQUAL_TAIL",
            Self::NoCrossing => "NO_CROSSING",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ClearingOutcome: the pure result of price discovery
// ---------------------------------------------------------------------------

/// Uniform clearing price and quantity for one book snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingOutcome {
    /// Number of units that trade.
    pub cleared_quantity: u64,
    /// Price every matched unit trades at.
    pub cleared_price: Decimal,
    /// The crossing shape that decided the price.
    pub rule: ClearingRule,
}

impl ClearingOutcome {
    /// Total value changing hands: quantity × price.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if the product is out of range.
    pub fn turnover(&self) -> Result<Decimal> {
        crate::amount::value_of(self.cleared_price, self.cleared_quantity)
    }
}

// ---------------------------------------------------------------------------
// ClearingReceipt: what a successful clear returns and persists
// ---------------------------------------------------------------------------

/// Result of clearing a round, returned to the caller and stored on the
/// round so a repeated clear is answered without touching balances again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearingReceipt {
    pub cleared_quantity: u64,
    pub cleared_price: Decimal,
    pub rule: ClearingRule,
    /// Hex SHA-256 commitment over book, outcome and settlement.
    pub settlement_root: String,
}

impl ClearingReceipt {
    /// The outcome part of the receipt, as recomputed on replay.
    #[must_use]
    pub fn outcome(&self) -> ClearingOutcome {
        ClearingOutcome {
            cleared_quantity: self.cleared_quantity,
            cleared_price: self.cleared_price,
            rule: self.rule,
        }
    }
}

// ---------------------------------------------------------------------------
// Round: the persisted state of one auction instance
// ---------------------------------------------------------------------------

/// Persisted state of one auction round.
///
/// `buyers_pay[i]` belongs to `buyers[i]` and `sellers_pay[i]` to
/// `sellers[i]`: alignment is by slot position, not by participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub closed: bool,
    /// Sorted by price descending, then by sequence.
    pub buyers: Vec<Bid>,
    /// Sorted by price ascending, then by sequence.
    pub sellers: Vec<Bid>,
    pub buyers_pay: Vec<Decimal>,
    pub sellers_pay: Vec<Decimal>,
    /// Sequence number the next submitted bid receives.
    pub next_seq: u64,
    /// Receipt of the clearing that closed this round, if any.
    pub outcome: Option<ClearingReceipt>,
}

impl Round {
    /// A fresh, open, empty round.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Empty the book and settlement, reopening the round for a new period.
    pub fn reset(&mut self) {
        self.closed = false;
        self.buyers.clear();
        self.sellers.clear();
        self.buyers_pay.clear();
        self.sellers_pay.clear();
        self.next_seq = 0;
        self.outcome = None;
    }

    /// Total number of bid slots on both sides.
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.buyers.len() + self.sellers.len()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_round() -> Round {
        Round {
            closed: true,
            buyers: vec![Bid::dummy("a", dec!(10), 5, 0)],
            sellers: vec![Bid::dummy("b", dec!(6), 5, 1)],
            buyers_pay: vec![dec!(30)],
            sellers_pay: vec![dec!(30)],
            next_seq: 2,
            outcome: Some(ClearingReceipt {
                cleared_quantity: 5,
                cleared_price: dec!(6),
                rule: ClearingRule::TopBuyerTakesSupply,
                settlement_root: "00".repeat(32),
            }),
        }
    }

    #[test]
    fn open_round_is_empty() {
        let round = Round::open();
        assert!(!round.closed);
        assert_eq!(round.bid_count(), 0);
        assert!(round.outcome.is_none());
    }

    #[test]
    fn reset_reopens() {
        let mut round = sample_round();
        round.reset();
        assert_eq!(round, Round::open());
    }

    #[test]
    fn persisted_shape_uses_camel_case() {
        let json = serde_json::to_value(sample_round()).unwrap();
        for key in ["closed", "buyers", "sellers", "buyersPay", "sellersPay", "nextSeq"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["outcome"]["clearedQuantity"], 5);
    }

    #[test]
    fn round_serde_roundtrip() {
        let round = sample_round();
        let bytes = serde_json::to_vec(&round).unwrap();
        let back: Round = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(round, back);
    }

    #[test]
    fn outcome_turnover() {
        let outcome = ClearingOutcome {
            cleared_quantity: 4,
            cleared_price: dec!(2.25),
            rule: ClearingRule::NoCrossing,
        };
        assert_eq!(outcome.turnover().unwrap(), dec!(9));
        let huge = ClearingOutcome {
            cleared_price: Decimal::MAX,
            ..outcome
        };
        assert!(huge.turnover().is_err());
    }

    #[test]
    fn rule_display() {
        assert_eq!(ClearingRule::GapMidpoint.to_string(), "GAP_MIDPOINT");
    }

    #[test]
    fn persisted_rule_name_matches_display() {
        let rules = [
            ClearingRule::NoTrade,
            ClearingRule::DemandConstrained,
            ClearingRule::TopBuyerTakesSupply,
            ClearingRule::FlatSupplyStep,
            ClearingRule::SupplyStepInside,
            ClearingRule::FlatDemandStep,
            ClearingRule::DemandStepInside,
            ClearingRule::GapMidpoint,
            ClearingRule::TouchingLastMatch,
            ClearingRule::EqualTail,
            ClearingRule::NoCrossing,
        ];
        for rule in rules {
            let json = serde_json::to_value(rule).unwrap();
            assert_eq!(json, serde_json::Value::String(rule.to_string()));
            let back: ClearingRule = serde_json::from_value(json).unwrap();
            assert_eq!(back, rule);
        }
        let json = serde_json::to_value(sample_round()).unwrap();
        assert_eq!(json["outcome"]["rule"], "TOP_BUYER_TAKES_SUPPLY");
    }
}
