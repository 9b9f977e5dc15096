//! Bid input gate.
//!
//! Every submission passes through here before it touches a round:
//! - **Fail-closed**: any unparsable or out-of-range value rejects the whole
//!   submission
//! - **Explicit tiers**: the configured [`TierPolicy`] decides whether a
//!   multi-pair encoding becomes one slot or several
//!
//! The text encoding is two comma-separated lists of equal length, e.g.
//! prices `"9.5,8"` with quantities `"3,2"`.

use std::str::FromStr;

use dauction_types::{AuctionError, Result, TierPolicy, constants, validate_quote};
use rust_decimal::Decimal;

/// One validated (price, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    pub quantity: u64,
}

/// Check a single quote against the positivity rules and the quantity cap.
///
/// # Errors
/// `MalformedInput` if the price is not positive, the quantity is zero, or
/// the quantity exceeds `max_quantity`.
pub fn check_quote(price: Decimal, quantity: u64, max_quantity: u64) -> Result<Quote> {
    validate_quote(price, quantity)?;
    if quantity > max_quantity {
        return Err(AuctionError::malformed(format!(
            "quantity {quantity} exceeds maximum {max_quantity}"
        )));
    }
    Ok(Quote { price, quantity })
}

/// Parse an encoded submission into the quotes to insert.
///
/// The whole encoding is validated under either policy. `SingleSlot` then
/// keeps only the first pair; `Tiered` keeps all of them in list order.
///
/// # Errors
/// `MalformedInput` for empty lists, mismatched lengths, unparsable
/// numbers, non-positive prices, zero quantities, or quantities above
/// `max_quantity`.
pub fn parse_encoded(
    prices: &str,
    quantities: &str,
    policy: TierPolicy,
    max_quantity: u64,
) -> Result<Vec<Quote>> {
    let prices = split_list(prices, "prices")?;
    let quantities = split_list(quantities, "quantities")?;
    if prices.len() != quantities.len() {
        return Err(AuctionError::malformed(format!(
            "{} prices but {} quantities",
            prices.len(),
            quantities.len()
        )));
    }

    let mut quotes = prices
        .iter()
        .zip(&quantities)
        .map(|(p, q)| check_quote(parse_price(p)?, parse_quantity(q)?, max_quantity))
        .collect::<Result<Vec<_>>>()?;

    if policy == TierPolicy::SingleSlot {
        quotes.truncate(1);
    }
    Ok(quotes)
}

fn split_list<'a>(encoded: &'a str, what: &str) -> Result<Vec<&'a str>> {
    let items: Vec<&str> = encoded.split(constants::LIST_SEPARATOR).map(str::trim).collect();
    if items.iter().any(|item| item.is_empty()) {
        return Err(AuctionError::malformed(format!(
            "{what} list has an empty entry: {encoded:?}"
        )));
    }
    Ok(items)
}

fn parse_price(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| AuctionError::malformed(format!("price {raw:?}: {e}")))
}

fn parse_quantity(raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|e| AuctionError::malformed(format!("quantity {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const MAX: u64 = constants::DEFAULT_MAX_BID_QUANTITY;

    fn assert_malformed(result: Result<Vec<Quote>>) {
        assert!(
            matches!(result, Err(AuctionError::MalformedInput { .. })),
            "expected MalformedInput, got {result:?}"
        );
    }

    #[test]
    fn single_slot_keeps_first_pair() {
        let quotes = parse_encoded("9.5,8", "3,2", TierPolicy::SingleSlot, MAX).unwrap();
        assert_eq!(
            quotes,
            vec![Quote {
                price: dec!(9.5),
                quantity: 3
            }]
        );
    }

    #[test]
    fn tiered_keeps_every_pair_in_order() {
        let quotes = parse_encoded("9.5, 8", "3, 2", TierPolicy::Tiered, MAX).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].price, dec!(8));
        assert_eq!(quotes[1].quantity, 2);
    }

    #[test]
    fn single_value_is_one_slot() {
        let quotes = parse_encoded("7", "4", TierPolicy::Tiered, MAX).unwrap();
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert_malformed(parse_encoded("9,8", "3", TierPolicy::Tiered, MAX));
        // SingleSlot still checks the whole encoding.
        assert_malformed(parse_encoded("9,8", "3", TierPolicy::SingleSlot, MAX));
    }

    #[test]
    fn rejects_empty_entries() {
        assert_malformed(parse_encoded("", "3", TierPolicy::SingleSlot, MAX));
        assert_malformed(parse_encoded("9,", "3,2", TierPolicy::Tiered, MAX));
    }

    #[test]
    fn rejects_unparsable_numbers() {
        assert_malformed(parse_encoded("nine", "3", TierPolicy::SingleSlot, MAX));
        assert_malformed(parse_encoded("9", "3.5", TierPolicy::SingleSlot, MAX));
        assert_malformed(parse_encoded("9", "-3", TierPolicy::SingleSlot, MAX));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_malformed(parse_encoded("0", "3", TierPolicy::SingleSlot, MAX));
        assert_malformed(parse_encoded("-1", "3", TierPolicy::SingleSlot, MAX));
        assert_malformed(parse_encoded("9", "0", TierPolicy::SingleSlot, MAX));
        assert_malformed(parse_encoded("9", "11", TierPolicy::SingleSlot, 10));
    }

    #[test]
    fn check_quote_enforces_cap() {
        assert!(check_quote(dec!(1), 10, 10).is_ok());
        assert!(check_quote(dec!(1), 11, 10).is_err());
    }
}
