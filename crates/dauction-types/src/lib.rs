//! # dauction-types
//!
//! Shared types, errors, and configuration for the **Dauction** double
//! auction engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`RoundId`]
//! - **Bid model**: [`Bid`], [`BidSide`]
//! - **Round model**: [`Round`], [`ClearingOutcome`], [`ClearingRule`], [`ClearingReceipt`]
//! - **Account model**: [`Account`], [`RegistryRecord`], the [`AccountLedger`] seam
//! - **Configuration**: [`AuctionConfig`], [`TierPolicy`]
//! - **Errors**: [`AuctionError`] with `DA_ERR_` prefix codes, [`ErrorKind`]
//! - **Amounts**: checked `price × units` and sums in [`amount`]
//! - **Constants**: system-wide limits and defaults

pub mod account;
pub mod amount;
pub mod bid;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod round;

// Re-export all primary types at crate root:
//   use dauction_types::{Bid, BidSide, Round, AuctionError, ...};

pub use account::*;
pub use bid::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use ledger::*;
pub use round::*;
