//! Error types for the Dauction engine.
//!
//! All errors use the `DA_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Round errors
//! - 2xx: Account / registry errors
//! - 3xx: Input errors
//! - 5xx: Clearing errors
//! - 6xx: Settlement errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ParticipantId, RoundId};

/// Central error enum for all Dauction operations.
#[derive(Debug, Error)]
pub enum AuctionError {
    // =================================================================
    // Round Errors (1xx)
    // =================================================================
    /// No round is persisted under this id.
    #[error("DA_ERR_100: Round not found: {0}")]
    RoundNotFound(RoundId),

    /// A round with this id already exists.
    #[error("DA_ERR_101: Round already exists: {0}")]
    RoundAlreadyExists(RoundId),

    /// The round has been cleared and accepts no more bids until reset.
    #[error("DA_ERR_102: Round is closed: {0}")]
    RoundClosed(RoundId),

    /// One side of the round has reached its configured bid cap.
    #[error("DA_ERR_103: Bid book full: {side} side holds {limit} bids")]
    BookFull { side: crate::BidSide, limit: usize },

    // =================================================================
    // Account Errors (2xx)
    // =================================================================
    /// The account registry has not been initialized.
    #[error("DA_ERR_200: Account registry not initialized")]
    RegistryNotFound,

    /// An account with this digest is already registered.
    #[error("DA_ERR_201: Account already registered: {0}")]
    AccountAlreadyExists(ParticipantId),

    /// The participant has no account in the registry.
    #[error("DA_ERR_202: Participant not registered: {0}")]
    NotRegistered(ParticipantId),

    /// The caller may not perform this operation.
    #[error("DA_ERR_203: Unauthorized caller: {caller}")]
    Unauthorized { caller: String },

    // =================================================================
    // Input Errors (3xx)
    // =================================================================
    /// A price, quantity, identifier or side encoding could not be parsed.
    #[error("DA_ERR_300: Malformed input: {reason}")]
    MalformedInput { reason: String },

    // =================================================================
    // Clearing Errors (5xx)
    // =================================================================
    /// The book cannot be cleared in its current shape (e.g. an empty side).
    #[error("DA_ERR_500: Inconsistent book: {reason}")]
    InconsistentBook { reason: String },

    /// The demand and supply curves crossed in a shape no tie-break rule
    /// resolves. Carries the fallback that would have been used.
    #[error(
        "DA_ERR_501: Ambiguous crossing at unit {index}: fallback price {fallback_price}"
    )]
    AmbiguousCrossing { index: u64, fallback_price: Decimal },

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// Settlement would create or destroy value.
    #[error("DA_ERR_600: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// An amount left the representable decimal range.
    #[error("DA_ERR_601: Arithmetic overflow: {context}")]
    ArithmeticOverflow { context: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("DA_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("DA_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// The state store rejected a read or write.
    #[error("DA_ERR_902: Storage error: {0}")]
    Storage(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("DA_ERR_903: Configuration error: {0}")]
    Configuration(String),
}

/// Coarse failure taxonomy exposed to callers of the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Unauthorized,
    NotRegistered,
    MalformedInput,
    InconsistentBook,
    AmbiguousCrossing,
    RoundClosed,
    CapacityExceeded,
    InvariantViolation,
    Internal,
}

impl AuctionError {
    /// Shorthand for [`AuctionError::MalformedInput`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AuctionError::ArithmeticOverflow`].
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoundNotFound(_) | Self::RegistryNotFound => ErrorKind::NotFound,
            Self::RoundAlreadyExists(_) | Self::AccountAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }
            Self::RoundClosed(_) => ErrorKind::RoundClosed,
            Self::BookFull { .. } => ErrorKind::CapacityExceeded,
            Self::NotRegistered(_) => ErrorKind::NotRegistered,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
            Self::InconsistentBook { .. } => ErrorKind::InconsistentBook,
            Self::AmbiguousCrossing { .. } => ErrorKind::AmbiguousCrossing,
            Self::SupplyInvariantViolation { .. } | Self::ArithmeticOverflow { .. } => {
                ErrorKind::InvariantViolation
            }
            Self::Internal(_)
            | Self::Serialization(_)
            | Self::Storage(_)
            | Self::Configuration(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AuctionError>;

impl From<serde_json::Error> for AuctionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
