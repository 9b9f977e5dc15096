//! Checked decimal arithmetic for money amounts.
//!
//! `Decimal`'s operators panic when a result leaves the 96-bit mantissa
//! range. Every amount derived from bids or balances goes through these
//! helpers instead, so an out-of-range value surfaces as
//! [`AuctionError::ArithmeticOverflow`].

use rust_decimal::Decimal;

use crate::{AuctionError, Result};

/// `price × units`.
pub fn value_of(price: Decimal, units: u64) -> Result<Decimal> {
    price
        .checked_mul(Decimal::from(units))
        .ok_or_else(|| AuctionError::overflow(format!("{price} x {units} units")))
}

/// `balance + delta`.
pub fn add_amount(balance: Decimal, delta: Decimal) -> Result<Decimal> {
    balance
        .checked_add(delta)
        .ok_or_else(|| AuctionError::overflow(format!("{balance} + {delta}")))
}

/// Sum of `amounts`, failing on the first overflowing partial sum.
pub fn checked_total<'a, I>(amounts: I) -> Result<Decimal>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| add_amount(acc, *amount))
}
