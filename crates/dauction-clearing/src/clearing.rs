//! Uniform clearing price computation.
//!
//! Both sides become stepped unit curves (demand non-increasing, supply
//! non-decreasing) that are compared unit by unit. The outcome is decided by the
//! first matching branch of a fixed ladder; each branch corresponds to one
//! canonical shape in which a stepped demand curve meets a stepped supply
//! curve. Several conditions can hold at once, so the order of the checks
//! is part of the contract.
//!
//! The function is pure: same book in, same outcome out.

use dauction_types::{AuctionError, Bid, BidSide, ClearingOutcome, ClearingRule, Result};
use rust_decimal::Decimal;

use crate::bid_book::{BidBook, is_sorted_for};
use crate::unit_curve::UnitCurve;

/// Compute the clearing outcome for a book.
pub fn clear_book(book: &BidBook) -> Result<ClearingOutcome> {
    compute_clearing(book.buyers(), book.sellers())
}

/// Compute the uniform clearing quantity and price.
///
/// `buyers` must be in buy priority (price descending) and `sellers` in
/// sell priority (price ascending).
///
/// # Errors
/// - `InconsistentBook` if a side is empty, out of order, or holds more
///   than `u64::MAX` units
/// - `AmbiguousCrossing` if the curves cross in a shape no tie-break
///   resolves
/// - `ArithmeticOverflow` if a midpoint price is out of range
pub fn compute_clearing(buyers: &[Bid], sellers: &[Bid]) -> Result<ClearingOutcome> {
    if !is_sorted_for(BidSide::Buy, buyers) || !is_sorted_for(BidSide::Sell, sellers) {
        return Err(AuctionError::InconsistentBook {
            reason: "bid sequences are not in price priority".into(),
        });
    }
    let demand = UnitCurve::expand(BidSide::Buy, buyers)?;
    let supply = UnitCurve::expand(BidSide::Sell, sellers)?;
    let top_buyer_quantity = buyers.first().map_or(0, |b| b.quantity);
    clear_curves(top_buyer_quantity, &demand, &supply)
}

/// Run the clearing ladder over the two curves.
///
/// `top_buyer_quantity` must be the quantity of the bid behind the first
/// demand step.
pub(crate) fn clear_curves(
    top_buyer_quantity: u64,
    demand: &UnitCurve,
    supply: &UnitCurve,
) -> Result<ClearingOutcome> {
    let (Some(b0), Some(s0), Some(s_end)) = (demand.first(), supply.first(), supply.last()) else {
        return Err(AuctionError::InconsistentBook {
            reason: format!(
                "cannot clear with {} buyer units and {} seller units",
                demand.units(),
                supply.units()
            ),
        });
    };
    let total_supply = supply.units();

    // Best buyer is below best seller.
    if b0 < s0 {
        return Ok(outcome(0, midpoint(b0, s0)?, ClearingRule::NoTrade));
    }
    // Top buyer alone absorbs all supply and outbids every seller.
    if top_buyer_quantity > total_supply && b0 > s_end {
        return Ok(outcome(total_supply, b0, ClearingRule::DemandConstrained));
    }
    if top_buyer_quantity == total_supply && b0 > s_end {
        return Ok(outcome(
            total_supply,
            s_end,
            ClearingRule::TopBuyerTakesSupply,
        ));
    }

    if let Some(i) = demand.first_below(supply) {
        // b[0] >= s[0] was established above, so the crossing is past unit 0.
        if i == 0 {
            return Err(AuctionError::Internal(
                "curves cross at the first unit after the no-trade check".into(),
            ));
        }
        let (price, rule) = resolve_crossing(
            i,
            unit_price(demand, i - 1)?,
            unit_price(supply, i - 1)?,
            unit_price(demand, i)?,
            unit_price(supply, i)?,
        )?;
        return Ok(outcome(i, price, rule));
    }

    let n = demand.units().min(supply.units());
    let (b_last, s_last) = (unit_price(demand, n - 1)?, unit_price(supply, n - 1)?);
    if b_last == s_last {
        Ok(outcome(n, b_last, ClearingRule::EqualTail))
    } else {
        Ok(outcome(n, s_last, ClearingRule::NoCrossing))
    }
}

/// Pick the price at crossing unit `index` from the neighbouring unit prices.
///
/// `b_prev`/`s_prev` are the last matched demand/supply units, `b_i`/`s_i`
/// the first unmatched ones. On no match, fails with `AmbiguousCrossing`
/// carrying the fallback price: the midpoint of the interval
/// `[max(s_prev, b_i), min(b_prev, s_i)]` of prices that clear exactly
/// `index` units.
pub(crate) fn resolve_crossing(
    index: u64,
    b_prev: Decimal,
    s_prev: Decimal,
    b_i: Decimal,
    s_i: Decimal,
) -> Result<(Decimal, ClearingRule)> {
    if s_i == s_prev {
        Ok((s_i, ClearingRule::FlatSupplyStep))
    } else if s_prev > b_i && b_prev > s_i {
        Ok((s_i, ClearingRule::SupplyStepInside))
    } else if b_i == b_prev {
        Ok((b_i, ClearingRule::FlatDemandStep))
    } else if b_prev > s_i && s_prev < b_i {
        Ok((b_i, ClearingRule::DemandStepInside))
    } else if b_prev < s_i && b_i < s_prev {
        Ok((midpoint(b_prev, s_prev)?, ClearingRule::GapMidpoint))
    } else if s_prev == b_prev {
        Ok((s_prev, ClearingRule::TouchingLastMatch))
    } else {
        Err(AuctionError::AmbiguousCrossing {
            index,
            fallback_price: midpoint(s_prev.max(b_i), b_prev.min(s_i))?,
        })
    }
}

fn unit_price(curve: &UnitCurve, index: u64) -> Result<Decimal> {
    curve.price_at(index).ok_or_else(|| {
        AuctionError::Internal(format!(
            "unit {index} is past the end of the {} curve",
            curve.side
        ))
    })
}

/// Halfway between two prices. Halves first when the sum is out of range.
fn midpoint(a: Decimal, b: Decimal) -> Result<Decimal> {
    match a.checked_add(b) {
        Some(sum) => Ok(sum / Decimal::TWO),
        None => (a / Decimal::TWO)
            .checked_add(b / Decimal::TWO)
            .ok_or_else(|| AuctionError::overflow(format!("midpoint of {a} and {b}"))),
    }
}

fn outcome(cleared_quantity: u64, cleared_price: Decimal, rule: ClearingRule) -> ClearingOutcome {
    ClearingOutcome {
        cleared_quantity,
        cleared_price,
        rule,
    }
}
