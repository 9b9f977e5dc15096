//! Configuration for the auction dispatch layer.

use serde::{Deserialize, Serialize};

use crate::{AuctionError, Result, constants};

/// How a submission carrying several price/quantity pairs is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierPolicy {
    /// Only the first pair is inserted; the rest is ignored.
    #[default]
    SingleSlot,
    /// Every pair becomes its own bid slot for the same participant.
    Tiered,
}

/// Auction-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// The only caller allowed to initialize the account registry.
    pub privileged_caller: String,
    /// Treatment of multi-pair submissions.
    pub tier_policy: TierPolicy,
    /// Optional cap on bid slots per side. `None` means unbounded.
    pub max_bids_per_side: Option<usize>,
    /// Largest quantity a single bid may carry. Bounds unit expansion.
    pub max_bid_quantity: u64,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            privileged_caller: constants::DEFAULT_PRIVILEGED_CALLER.to_string(),
            tier_policy: TierPolicy::default(),
            max_bids_per_side: None,
            max_bid_quantity: constants::DEFAULT_MAX_BID_QUANTITY,
        }
    }
}

impl AuctionConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| AuctionError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.privileged_caller.is_empty() {
            return Err(AuctionError::Configuration(
                "privileged_caller must not be empty".into(),
            ));
        }
        if self.max_bid_quantity == 0 {
            return Err(AuctionError::Configuration(
                "max_bid_quantity must be at least 1".into(),
            ));
        }
        if self.max_bids_per_side == Some(0) {
            return Err(AuctionError::Configuration(
                "max_bids_per_side must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}
