//! The account ledger seam.
//!
//! The clearing core never owns balances. It reads registration and
//! applies additive deltas through [`AccountLedger`], which the surrounding
//! layer implements over whatever store it has.

use rust_decimal::Decimal;

use crate::{ParticipantId, Result};

/// Balance store keyed by participant digest.
pub trait AccountLedger {
    /// Current balance, or `None` if the participant is not registered.
    fn balance(&self, id: &ParticipantId) -> Option<Decimal>;

    /// Whether the participant is registered.
    fn contains(&self, id: &ParticipantId) -> bool {
        self.balance(id).is_some()
    }

    /// Add `delta` (which may be negative) to the participant's balance.
    ///
    /// # Errors
    /// Returns `NotRegistered` if the participant has no account and
    /// `ArithmeticOverflow` if the new balance is out of range.
    fn apply_delta(&mut self, id: &ParticipantId, delta: Decimal) -> Result<()>;
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
pub use helpers::MemoryLedger;

#[cfg(any(test, feature = "test-helpers"))]
mod helpers {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use super::AccountLedger;
    use crate::{AuctionError, ParticipantId, Result};

    /// Minimal ordered ledger for unit tests.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryLedger {
        pub balances: BTreeMap<ParticipantId, Decimal>,
    }

    impl MemoryLedger {
        /// Register every address with the same opening balance.
        pub fn with_addresses(addresses: &[&str], balance: Decimal) -> Self {
            let balances = addresses
                .iter()
                .map(|a| (ParticipantId::from_address(a), balance))
                .collect();
            Self { balances }
        }
    }

    impl AccountLedger for MemoryLedger {
        fn balance(&self, id: &ParticipantId) -> Option<Decimal> {
            self.balances.get(id).copied()
        }

        fn apply_delta(&mut self, id: &ParticipantId, delta: Decimal) -> Result<()> {
            let balance = self
                .balances
                .get_mut(id)
                .ok_or_else(|| AuctionError::NotRegistered(id.clone()))?;
            *balance = crate::amount::add_amount(*balance, delta)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn memory_ledger_applies_deltas() {
        let mut ledger = MemoryLedger::with_addresses(&["a"], dec!(100));
        let a = ParticipantId::from_address("a");
        ledger.apply_delta(&a, dec!(-30)).unwrap();
        assert_eq!(ledger.balance(&a), Some(dec!(70)));
        assert!(ledger.contains(&a));
    }

    #[test]
    fn unknown_participant_rejected() {
        let mut ledger = MemoryLedger::default();
        let b = ParticipantId::from_address("b");
        assert!(!ledger.contains(&b));
        let err = ledger.apply_delta(&b, dec!(1)).unwrap_err();
        assert!(matches!(err, crate::AuctionError::NotRegistered(_)));
    }

    #[test]
    fn overflowing_delta_leaves_balance() {
        let mut ledger = MemoryLedger::with_addresses(&["a"], Decimal::MAX);
        let a = ParticipantId::from_address("a");
        let err = ledger.apply_delta(&a, dec!(30)).unwrap_err();
        assert!(matches!(err, crate::AuctionError::ArithmeticOverflow { .. }));
        assert_eq!(ledger.balance(&a), Some(Decimal::MAX));
    }
}
