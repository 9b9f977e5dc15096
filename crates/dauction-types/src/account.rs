//! Account types for the participant registry.
//!
//! The persisted registry is two index-aligned sequences: `ids[i]` owns
//! `balances[i]`. In-memory lookup structures are built from this record by
//! the ledger crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionError, ParticipantId, Result};

/// A single registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: ParticipantId,
    pub balance: Decimal,
}

/// Persisted shape of the account registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub ids: Vec<ParticipantId>,
    pub balances: Vec<Decimal>,
}

impl RegistryRecord {
    /// Check index correspondence between `ids` and `balances`.
    pub fn validate(&self) -> Result<()> {
        if self.ids.len() != self.balances.len() {
            return Err(AuctionError::Serialization(format!(
                "registry has {} ids but {} balances",
                self.ids.len(),
                self.balances.len()
            )));
        }
        Ok(())
    }

    /// Iterate accounts in registration order.
    pub fn accounts(&self) -> impl Iterator<Item = Account> + '_ {
        self.ids
            .iter()
            .zip(&self.balances)
            .map(|(id, balance)| Account {
                id: id.clone(),
                balance: *balance,
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
