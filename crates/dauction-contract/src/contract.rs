//! Round lifecycle dispatch.
//!
//! [`AuctionContract`] is the only layer that touches the [`StateStore`].
//! Each operation loads what it needs, runs every fallible step on local
//! copies, and writes back only once nothing else can fail. A rejected call
//! leaves the store exactly as it found it.
//!
//! ## Round lifecycle
//!
//! ```text
//! create_round -> submit_bid* -> clear_round (closed) -> reset_round (open)
//!                                                     -> close_round (deleted)
//! ```

use dauction_clearing::{
    BidBook, allocate_book, clear_book, settlement_root_hex, verify_settlement_root,
};
use dauction_ledger::{AccountRegistry, settle};
use dauction_types::{
    Account, AccountLedger, AuctionConfig, AuctionError, BidSide, ClearingReceipt, ParticipantId,
    RegistryRecord, Result, Round, RoundId, constants,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bid_input::{Quote, check_quote, parse_encoded};
use crate::observer::{ClearingObserver, TracingObserver};
use crate::store::StateStore;

/// Double auction over a key-value store.
pub struct AuctionContract<S: StateStore, O: ClearingObserver = TracingObserver> {
    store: S,
    observer: O,
    config: AuctionConfig,
}

impl<S: StateStore> AuctionContract<S, TracingObserver> {
    /// Create a contract that reports through `tracing`.
    ///
    /// # Errors
    /// `Configuration` if `config` is invalid.
    pub fn new(store: S, config: AuctionConfig) -> Result<Self> {
        Self::with_observer(store, config, TracingObserver)
    }
}

impl<S: StateStore, O: ClearingObserver> AuctionContract<S, O> {
    /// Create a contract with a custom observer.
    ///
    /// # Errors
    /// `Configuration` if `config` is invalid.
    pub fn with_observer(store: S, config: AuctionConfig, observer: O) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            observer,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // =================================================================
    // Registry
    // =================================================================

    /// Write an empty account registry, replacing any existing one.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is the configured privileged caller.
    pub fn init_registry(&mut self, caller: &str) -> Result<()> {
        if caller != self.config.privileged_caller {
            return Err(AuctionError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        if self.store.contains(constants::REGISTRY_KEY)? {
            tracing::warn!(%caller, "Replacing existing account registry");
        }
        self.put_json(constants::REGISTRY_KEY, &RegistryRecord::default())
    }

    /// Register an account for an external address.
    ///
    /// # Errors
    /// - `RegistryNotFound` if the registry was never initialized
    /// - `AccountAlreadyExists` if the address is already registered
    /// - `MalformedInput` for a negative opening balance
    pub fn register_account(&mut self, address: &str, balance: Decimal) -> Result<ParticipantId> {
        let mut registry = self.load_registry()?;
        let id = registry.register_address(address, balance)?;
        self.put_json(constants::REGISTRY_KEY, &registry.to_record())?;
        Ok(id)
    }

    /// All accounts in registration order.
    ///
    /// # Errors
    /// `RegistryNotFound` if the registry was never initialized.
    pub fn query_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.load_registry()?.accounts().collect())
    }

    /// Balance of the account registered for `address`.
    ///
    /// # Errors
    /// `RegistryNotFound` or `NotRegistered`.
    pub fn balance_of(&self, address: &str) -> Result<Decimal> {
        let id = ParticipantId::from_address(address);
        self.load_registry()?
            .balance(&id)
            .ok_or(AuctionError::NotRegistered(id))
    }

    // =================================================================
    // Rounds
    // =================================================================

    /// Create an empty open round.
    ///
    /// # Errors
    /// - `MalformedInput` for an empty id
    /// - `RoundAlreadyExists` if the id is taken
    pub fn create_round(&mut self, round_id: &RoundId) -> Result<()> {
        if round_id.as_str().is_empty() {
            return Err(AuctionError::malformed("round id must not be empty"));
        }
        if self.round_exists(round_id)? {
            return Err(AuctionError::RoundAlreadyExists(round_id.clone()));
        }
        self.save_round(round_id, &Round::open())
    }

    /// Whether a round is stored under this id.
    ///
    /// # Errors
    /// `Storage` if the store fails.
    pub fn round_exists(&self, round_id: &RoundId) -> Result<bool> {
        self.store.contains(&round_key(round_id))
    }

    /// Persisted state of a round.
    ///
    /// # Errors
    /// `RoundNotFound` if the round does not exist.
    pub fn query_round(&self, round_id: &RoundId) -> Result<Round> {
        self.load_round(round_id)
    }

    /// Submit one bid. Returns its sequence number.
    ///
    /// # Errors
    /// - `RoundNotFound`, `RoundClosed`
    /// - `RegistryNotFound`, `NotRegistered`
    /// - `MalformedInput` for a non-positive price or an out-of-range quantity
    /// - `BookFull` if the side is at the configured cap
    pub fn submit_bid(
        &mut self,
        round_id: &RoundId,
        side: BidSide,
        address: &str,
        price: Decimal,
        quantity: u64,
    ) -> Result<u64> {
        let quote = check_quote(price, quantity, self.config.max_bid_quantity)?;
        let seqs = self.insert_quotes(round_id, side, address, &[quote])?;
        seqs.first()
            .copied()
            .ok_or_else(|| AuctionError::Internal("no bid inserted".into()))
    }

    /// Submit a comma-separated multi-value bid. Returns the sequence number
    /// of every inserted slot.
    ///
    /// # Errors
    /// As [`submit_bid`](Self::submit_bid), plus `MalformedInput` for a bad
    /// encoding. A rejected pair rejects the whole submission.
    pub fn submit_encoded_bid(
        &mut self,
        round_id: &RoundId,
        side: BidSide,
        address: &str,
        prices: &str,
        quantities: &str,
    ) -> Result<Vec<u64>> {
        let quotes = parse_encoded(
            prices,
            quantities,
            self.config.tier_policy,
            self.config.max_bid_quantity,
        )?;
        self.insert_quotes(round_id, side, address, &quotes)
    }

    fn insert_quotes(
        &mut self,
        round_id: &RoundId,
        side: BidSide,
        address: &str,
        quotes: &[Quote],
    ) -> Result<Vec<u64>> {
        let mut round = self.load_round(round_id)?;
        if round.closed {
            return Err(AuctionError::RoundClosed(round_id.clone()));
        }
        let registry = self.load_registry()?;
        let participant = ParticipantId::from_address(address);

        let mut book = self.book_of(&round);
        let mut seqs = Vec::with_capacity(quotes.len());
        for quote in quotes {
            let seq = book.insert(
                &registry,
                side,
                participant.clone(),
                quote.price,
                quote.quantity,
            )?;
            seqs.push(seq);
        }

        for bid in book.side(side).iter().filter(|b| seqs.contains(&b.seq)) {
            self.observer.bid_accepted(round_id, side, bid);
        }
        store_book(&mut round, book);
        self.save_round(round_id, &round)?;
        Ok(seqs)
    }

    /// Clear a round, settle balances, and close it.
    ///
    /// Clearing a round that is already closed re-checks the stored receipt
    /// against the persisted book, returns it, and leaves balances alone.
    ///
    /// # Errors
    /// - `RoundNotFound`, `RegistryNotFound`
    /// - `InconsistentBook` if a side is empty
    /// - `AmbiguousCrossing` if the curves cross in an unresolvable shape
    /// - `NotRegistered`, `SupplyInvariantViolation` from settlement
    /// - `ArithmeticOverflow` if a payment or balance is out of range
    /// - `Internal` if a closed round's receipt does not match its book
    pub fn clear_round(&mut self, round_id: &RoundId) -> Result<ClearingReceipt> {
        let round = self.load_round(round_id)?;
        if round.closed {
            return match self.replay_receipt(round_id, &round) {
                Ok(receipt) => {
                    self.observer.clear_replayed(round_id, &receipt);
                    Ok(receipt)
                }
                Err(e) => {
                    self.observer.clearing_failed(round_id, &e);
                    Err(e)
                }
            };
        }

        match self.clear_open_round(round_id, round) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                self.observer.clearing_failed(round_id, &e);
                Err(e)
            }
        }
    }

    /// Recompute a closed round's settlement and check it against what was
    /// stored.
    fn replay_receipt(&self, round_id: &RoundId, round: &Round) -> Result<ClearingReceipt> {
        let receipt = round.outcome.clone().ok_or_else(|| {
            AuctionError::Internal(format!("{round_id} is closed without a receipt"))
        })?;
        let book = self.book_of(round);
        let outcome = receipt.outcome();
        let allocation = allocate_book(&outcome, &book)?;
        let pay_matches = allocation.buyers_pay == round.buyers_pay
            && allocation.sellers_receive == round.sellers_pay;
        if !pay_matches
            || !verify_settlement_root(&book, &outcome, &allocation, &receipt.settlement_root)
        {
            return Err(AuctionError::Internal(format!(
                "{round_id} receipt does not match its persisted book"
            )));
        }
        Ok(receipt)
    }

    fn clear_open_round(&mut self, round_id: &RoundId, mut round: Round) -> Result<ClearingReceipt> {
        let mut registry = self.load_registry()?;
        let book = self.book_of(&round);

        let outcome = clear_book(&book)?;
        let allocation = allocate_book(&outcome, &book)?;
        let summary = settle(&mut registry, &book, &allocation)?;

        let receipt = ClearingReceipt {
            cleared_quantity: outcome.cleared_quantity,
            cleared_price: outcome.cleared_price,
            rule: outcome.rule,
            settlement_root: settlement_root_hex(&book, &outcome, &allocation),
        };

        store_book(&mut round, book);
        round.buyers_pay = allocation.buyers_pay;
        round.sellers_pay = allocation.sellers_receive;
        round.closed = true;
        round.outcome = Some(receipt.clone());

        let writes = vec![
            (
                constants::REGISTRY_KEY.to_string(),
                serde_json::to_vec(&registry.to_record())?,
            ),
            (round_key(round_id), serde_json::to_vec(&round)?),
        ];
        self.store.put_all(writes)?;

        self.observer.round_cleared(round_id, &receipt, &summary);
        Ok(receipt)
    }

    /// Empty a round's bids, settlement and receipt, and reopen it.
    ///
    /// # Errors
    /// `RoundNotFound` if the round does not exist.
    pub fn reset_round(&mut self, round_id: &RoundId) -> Result<()> {
        let mut round = self.load_round(round_id)?;
        round.reset();
        self.save_round(round_id, &round)?;
        self.observer.round_reset(round_id);
        Ok(())
    }

    /// Delete a round's persisted state.
    ///
    /// # Errors
    /// `RoundNotFound` if the round does not exist.
    pub fn close_round(&mut self, round_id: &RoundId) -> Result<()> {
        if !self.round_exists(round_id)? {
            return Err(AuctionError::RoundNotFound(round_id.clone()));
        }
        self.store.delete(&round_key(round_id))?;
        self.observer.round_closed(round_id);
        Ok(())
    }

    // =================================================================
    // Persistence helpers
    // =================================================================

    fn book_of(&self, round: &Round) -> BidBook {
        let mut book =
            BidBook::from_sides(round.buyers.clone(), round.sellers.clone(), round.next_seq);
        book.set_limit(self.config.max_bids_per_side);
        book
    }

    fn load_registry(&self) -> Result<AccountRegistry> {
        let record: RegistryRecord = self
            .get_json(constants::REGISTRY_KEY)?
            .ok_or(AuctionError::RegistryNotFound)?;
        AccountRegistry::from_record(record)
    }

    fn load_round(&self, round_id: &RoundId) -> Result<Round> {
        self.get_json(&round_key(round_id))?
            .ok_or_else(|| AuctionError::RoundNotFound(round_id.clone()))
    }

    fn save_round(&mut self, round_id: &RoundId, round: &Round) -> Result<()> {
        self.put_json(&round_key(round_id), round)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.store
            .get(key)?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(AuctionError::from))
            .transpose()
    }

    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.put(key, bytes)
    }
}

fn round_key(round_id: &RoundId) -> String {
    format!("{}{}", constants::ROUND_KEY_PREFIX, round_id.as_str())
}

/// Move a book's sides back into a round, keeping pay arrays slot-aligned.
fn store_book(round: &mut Round, book: BidBook) {
    let (buyers, sellers, next_seq) = book.into_sides();
    round.buyers_pay = vec![Decimal::ZERO; buyers.len()];
    round.sellers_pay = vec![Decimal::ZERO; sellers.len()];
    round.buyers = buyers;
    round.sellers = sellers;
    round.next_seq = next_seq;
}
