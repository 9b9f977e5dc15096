//! Account registry.
//!
//! Tracks one balance per participant digest. Persisted as the index-aligned
//! [`RegistryRecord`]; held in memory with a digest → position map so
//! lookups don't scan.

use std::collections::HashMap;

use dauction_types::amount::add_amount;
use dauction_types::{
    Account, AccountLedger, AuctionError, ParticipantId, RegistryRecord, Result,
};
use rust_decimal::Decimal;

/// Reference [`AccountLedger`] implementation.
///
/// Registration order is preserved: it is the order of the persisted
/// `ids`/`balances` sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRegistry {
    ids: Vec<ParticipantId>,
    balances: Vec<Decimal>,
    index: HashMap<ParticipantId, usize>,
}

impl AccountRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the persisted shape.
    ///
    /// # Errors
    /// `Serialization` if the sequences differ in length or an id repeats.
    pub fn from_record(record: RegistryRecord) -> Result<Self> {
        record.validate()?;
        let RegistryRecord { ids, balances } = record;
        let mut index = HashMap::with_capacity(ids.len());
        for (pos, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), pos).is_some() {
                return Err(AuctionError::Serialization(format!(
                    "registry lists {id} more than once"
                )));
            }
        }
        Ok(Self {
            ids,
            balances,
            index,
        })
    }

    /// Persisted shape of this registry.
    #[must_use]
    pub fn to_record(&self) -> RegistryRecord {
        RegistryRecord {
            ids: self.ids.clone(),
            balances: self.balances.clone(),
        }
    }

    /// Register a new account with an opening balance.
    ///
    /// # Errors
    /// - `AccountAlreadyExists` if the digest is already present
    /// - `MalformedInput` if the opening balance is negative
    pub fn register(&mut self, id: ParticipantId, balance: Decimal) -> Result<usize> {
        if balance < Decimal::ZERO {
            return Err(AuctionError::malformed(format!(
                "opening balance must not be negative, got {balance}"
            )));
        }
        if self.index.contains_key(&id) {
            return Err(AuctionError::AccountAlreadyExists(id));
        }
        let pos = self.ids.len();
        tracing::debug!(participant = %id.short(), %balance, "Account registered");
        self.index.insert(id.clone(), pos);
        self.ids.push(id);
        self.balances.push(balance);
        Ok(pos)
    }

    /// Register by external address; the address is digested first.
    ///
    /// # Errors
    /// See [`register`](Self::register).
    pub fn register_address(&mut self, address: &str, balance: Decimal) -> Result<ParticipantId> {
        let id = ParticipantId::from_address(address);
        self.register(id.clone(), balance)?;
        Ok(id)
    }

    /// Position of a participant in registration order.
    #[must_use]
    pub fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.index.get(id).copied()
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

impl AccountLedger for AccountRegistry {
    fn balance(&self, id: &ParticipantId) -> Option<Decimal> {
        self.position(id).map(|pos| self.balances[pos])
    }

    fn contains(&self, id: &ParticipantId) -> bool {
        self.index.contains_key(id)
    }

    fn apply_delta(&mut self, id: &ParticipantId, delta: Decimal) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| AuctionError::NotRegistered(id.clone()))?;
        self.balances[pos] = add_amount(self.balances[pos], delta)?;
        Ok(())
    }
}

impl TryFrom<RegistryRecord> for AccountRegistry {
    type Error = AuctionError;

    fn try_from(record: RegistryRecord) -> Result<Self> {
        Self::from_record(record)
    }
}

impl From<&AccountRegistry> for RegistryRecord {
    fn from(registry: &AccountRegistry) -> Self {
        registry.to_record()
    }
}
