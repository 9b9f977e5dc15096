//! # dauction-clearing
//!
//! **Pure deterministic clearing core for Dauction.**
//!
//! Takes one round's bid book and produces a uniform clearing price,
//! quantity and per-slot settlement. It has:
//!
//! - **Zero side effects**: no store writes, no balance mutation, no logging
//! - **Deterministic output**: same book -> same outcome on every replica
//! - **Total ordering**: price priority with a submission-sequence tie-break
//! - **Verifiable results**: a SHA-256 settlement root per clearing

pub mod allocation;
pub mod bid_book;
pub mod clearing;
pub mod determinism;
pub mod unit_curve;

pub use allocation::{Allocation, allocate, allocate_book};
pub use bid_book::BidBook;
pub use clearing::{clear_book, compute_clearing};
pub use determinism::{compute_settlement_root, settlement_root_hex, verify_settlement_root};
pub use unit_curve::UnitCurve;
