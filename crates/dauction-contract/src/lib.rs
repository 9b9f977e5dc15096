//! # dauction-contract
//!
//! **Dispatch plane**: the externally callable auction operations over a
//! key-value state store.
//!
//! ## Architecture
//!
//! The contract sits between the host environment and the clearing core:
//! 1. **StateStore**: JSON documents under `registry` and `round:<id>`
//! 2. **Bid input**: parses and validates submissions, applies the tier policy
//! 3. **AuctionContract**: loads state, runs clearing and settlement, writes back
//! 4. **ClearingObserver**: receives lifecycle events for logging
//!
//! ## Clear Flow
//!
//! ```text
//! load round + registry → BidBook → clear_book → allocate → settle
//!     → settlement root → write registry + round
//! ```

pub mod bid_input;
pub mod contract;
pub mod observer;
pub mod store;

pub use bid_input::{Quote, check_quote, parse_encoded};
pub use contract::AuctionContract;
pub use observer::{ClearingObserver, NoopObserver, TracingObserver};
pub use store::{MemoryStore, StateStore};
