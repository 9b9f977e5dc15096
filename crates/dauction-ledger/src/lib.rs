//! # dauction-ledger
//!
//! **Settlement plane**: account registry and balance finality.
//!
//! ## Architecture
//!
//! Takes a cleared [`BidBook`](dauction_clearing::BidBook) and its
//! [`Allocation`](dauction_clearing::Allocation) and:
//! 1. Checks every participant is registered
//! 2. Stages one additive delta per bid slot (buyers pay, sellers receive)
//! 3. Checks supply conservation over the touched accounts
//! 4. Commits the staged balances, or leaves the ledger untouched on error

pub mod registry;
pub mod settle;
pub mod supply_conservation;

pub use registry::AccountRegistry;
pub use settle::{SettlementSummary, settle};
pub use supply_conservation::SupplyConservation;
