//! Supply conservation invariant checker.
//!
//! Settlement only moves value between participants:
//! ```text
//! Σ(balances after settlement) == Σ(balances before settlement)
//! ```
//!
//! The check is done on per-account changes, `Σ(after − before) == 0`, so
//! it holds for balances whose plain total would not fit in a `Decimal`.
//! If the net change is not zero, the settlement is rejected before any
//! balance is committed.

use dauction_types::amount::{add_amount, checked_total};
use dauction_types::{AccountLedger, AuctionError, ParticipantId, Result};
use rust_decimal::Decimal;

/// Opening balances of the accounts a settlement may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyConservation {
    opening: Vec<(ParticipantId, Decimal)>,
}

impl SupplyConservation {
    /// Record the current balance of every id in `ids`.
    ///
    /// # Errors
    /// `NotRegistered` if any id has no account.
    pub fn snapshot<'a, L, I>(ledger: &L, ids: I) -> Result<Self>
    where
        L: AccountLedger + ?Sized,
        I: IntoIterator<Item = &'a ParticipantId>,
    {
        let opening = ids
            .into_iter()
            .map(|id| {
                ledger
                    .balance(id)
                    .map(|balance| (id.clone(), balance))
                    .ok_or_else(|| AuctionError::NotRegistered(id.clone()))
            })
            .collect::<Result<_>>()?;
        Ok(Self { opening })
    }

    /// Net change across the snapshotted accounts.
    ///
    /// # Errors
    /// `SupplyInvariantViolation` if an account disappeared and
    /// `ArithmeticOverflow` if a change is out of range.
    pub fn net_change<L: AccountLedger + ?Sized>(&self, ledger: &L) -> Result<Decimal> {
        let changes = self
            .opening
            .iter()
            .map(|(id, before)| {
                let after = ledger.balance(id).ok_or_else(|| {
                    AuctionError::SupplyInvariantViolation {
                        reason: format!("account {} vanished during settlement", id.short()),
                    }
                })?;
                add_amount(after, -*before)
            })
            .collect::<Result<Vec<_>>>()?;
        checked_total(&changes)
    }

    /// Verify the ledger holds the same supply as at the snapshot.
    ///
    /// # Errors
    /// Returns [`AuctionError::SupplyInvariantViolation`] if the net change
    /// is not zero.
    pub fn verify<L: AccountLedger + ?Sized>(&self, ledger: &L) -> Result<()> {
        let drift = self.net_change(ledger)?;
        if !drift.is_zero() {
            return Err(AuctionError::SupplyInvariantViolation {
                reason: format!(
                    "{} accounts drifted by {drift}",
                    self.opening.len()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dauction_types::MemoryLedger;
    use rust_decimal_macros::dec;

    use super::*;

    fn ids(addresses: &[&str]) -> Vec<ParticipantId> {
        addresses.iter().map(|a| ParticipantId::from_address(a)).collect()
    }

    #[test]
    fn empty_snapshot_always_verifies() {
        let sc = SupplyConservation::default();
        assert!(sc.verify(&MemoryLedger::default()).is_ok());
    }

    #[test]
    fn transfers_between_accounts_verify() {
        let mut ledger = MemoryLedger::with_addresses(&["a", "b"], dec!(7.25));
        let ids = ids(&["a", "b"]);
        let sc = SupplyConservation::snapshot(&ledger, &ids).unwrap();
        ledger.apply_delta(&ids[0], dec!(-3.5)).unwrap();
        ledger.apply_delta(&ids[1], dec!(3.500)).unwrap();
        assert_eq!(sc.net_change(&ledger).unwrap(), Decimal::ZERO);
        assert!(sc.verify(&ledger).is_ok());
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut ledger = MemoryLedger::with_addresses(&["a"], dec!(10));
        let ids = ids(&["a"]);
        let sc = SupplyConservation::snapshot(&ledger, &ids).unwrap();
        ledger.apply_delta(&ids[0], dec!(1)).unwrap();
        let err = sc.verify(&ledger).unwrap_err();
        assert!(matches!(err, AuctionError::SupplyInvariantViolation { .. }));
        assert!(err.to_string().contains("drifted by 1"));
    }

    #[test]
    fn balances_beyond_summable_range_still_verify() {
        // The plain total of these balances would overflow.
        let mut ledger = MemoryLedger::with_addresses(&["a", "b"], Decimal::MAX - dec!(10));
        let ids = ids(&["a", "b"]);
        let sc = SupplyConservation::snapshot(&ledger, &ids).unwrap();
        ledger.apply_delta(&ids[0], dec!(-5)).unwrap();
        ledger.apply_delta(&ids[1], dec!(5)).unwrap();
        assert!(sc.verify(&ledger).is_ok());
    }

    #[test]
    fn unknown_account_cannot_be_snapshotted() {
        let ledger = MemoryLedger::default();
        let err = SupplyConservation::snapshot(&ledger, &ids(&["a"])).unwrap_err();
        assert!(matches!(err, AuctionError::NotRegistered(_)));
    }

    #[test]
    fn vanished_account_is_a_violation() {
        let mut ledger = MemoryLedger::with_addresses(&["a"], dec!(10));
        let sc = SupplyConservation::snapshot(&ledger, &ids(&["a"])).unwrap();
        ledger.balances.clear();
        assert!(matches!(
            sc.verify(&ledger),
            Err(AuctionError::SupplyInvariantViolation { .. })
        ));
    }
}
