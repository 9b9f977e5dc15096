//! Bid types for the Dauction double auction.
//!
//! A bid is one (price, quantity) slot quoted by a registered participant on
//! one side of a round. Within a side, bids are ranked by price and then by
//! submission sequence, which makes the ordering total.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionError, ParticipantId, Result};

/// Which side of the round a bid is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BidSide {
    Buy,
    Sell,
}

impl BidSide {
    /// Price-priority comparator for this side.
    ///
    /// Buyers rank highest price first, sellers lowest price first. Equal
    /// prices fall back to ascending submission sequence.
    #[must_use]
    pub fn priority(self, a: &Bid, b: &Bid) -> Ordering {
        let by_price = match self {
            Self::Buy => b.price.cmp(&a.price),
            Self::Sell => a.price.cmp(&b.price),
        };
        by_price.then_with(|| a.seq.cmp(&b.seq))
    }

    /// Sign applied to a settlement amount: buyers pay, sellers receive.
    #[must_use]
    pub fn delta_sign(self) -> Decimal {
        match self {
            Self::Buy => Decimal::NEGATIVE_ONE,
            Self::Sell => Decimal::ONE,
        }
    }
}

impl std::fmt::Display for BidSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for BidSide {
    type Err = AuctionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "buyer" | "bid" => Ok(Self::Buy),
            "sell" | "seller" | "ask" => Ok(Self::Sell),
            other => Err(AuctionError::malformed(format!("unknown bid side {other:?}"))),
        }
    }
}

/// A single bid slot in a round's book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Digest of the bidding participant.
    #[serde(rename = "id")]
    pub participant: ParticipantId,
    /// Unit price. Always strictly positive.
    pub price: Decimal,
    /// Number of units. Always at least one.
    pub quantity: u64,
    /// Submission sequence within the round; the tie-break key.
    pub seq: u64,
}

impl Bid {
    /// Build a bid after checking price and quantity.
    pub fn new(participant: ParticipantId, price: Decimal, quantity: u64, seq: u64) -> Result<Self> {
        validate_quote(price, quantity)?;
        Ok(Self {
            participant,
            price,
            quantity,
            seq,
        })
    }
}

/// Check a single (price, quantity) quote.
pub fn validate_quote(price: Decimal, quantity: u64) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(AuctionError::malformed(format!(
            "price must be positive, got {price}"
        )));
    }
    if quantity == 0 {
        return Err(AuctionError::malformed("quantity must be at least 1"));
    }
    Ok(())
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Bid {
    /// Bid for the participant hashed from `address`, without validation.
    pub fn dummy(address: &str, price: Decimal, quantity: u64, seq: u64) -> Self {
        Self {
            participant: ParticipantId::from_address(address),
            price,
            quantity,
            seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn buy_priority_highest_price_first() {
        let hi = Bid::dummy("a", dec!(10), 1, 5);
        let lo = Bid::dummy("b", dec!(9), 1, 0);
        assert_eq!(BidSide::Buy.priority(&hi, &lo), Ordering::Less);
        assert_eq!(BidSide::Sell.priority(&hi, &lo), Ordering::Greater);
    }

    #[test]
    fn equal_prices_break_on_sequence() {
        let first = Bid::dummy("a", dec!(7), 1, 0);
        let second = Bid::dummy("b", dec!(7), 1, 1);
        assert_eq!(BidSide::Buy.priority(&first, &second), Ordering::Less);
        assert_eq!(BidSide::Sell.priority(&first, &second), Ordering::Less);
    }

    #[test]
    fn new_rejects_bad_quotes() {
        let pid = ParticipantId::from_address("a");
        assert!(Bid::new(pid.clone(), dec!(0), 1, 0).is_err());
        assert!(Bid::new(pid.clone(), dec!(-1), 1, 0).is_err());
        assert!(Bid::new(pid.clone(), dec!(1), 0, 0).is_err());
        assert!(Bid::new(pid, dec!(0.01), 1, 0).is_ok());
    }

    #[test]
    fn side_parsing() {
        assert_eq!("buy".parse::<BidSide>().unwrap(), BidSide::Buy);
        assert_eq!(" Seller ".parse::<BidSide>().unwrap(), BidSide::Sell);
        assert!("hold".parse::<BidSide>().is_err());
    }

    #[test]
    fn side_display() {
        assert_eq!(format!("{}", BidSide::Buy), "BUY");
        assert_eq!(format!("{}", BidSide::Sell), "SELL");
    }

    #[test]
    fn persisted_field_names() {
        let bid = Bid::dummy("a", dec!(9), 3, 2);
        let json = serde_json::to_value(&bid).unwrap();
        assert!(json.get("id").is_some());
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["seq"], 2);
    }
}
