//! Identifiers used throughout Dauction.
//!
//! Participants are never keyed by their raw external address: the address
//! is hashed once with SHA-256 and the lowercase hex digest is what gets
//! stored and compared.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AuctionError, constants};

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Fixed-length digest of an external participant address.
///
/// Always 64 lowercase hex characters (SHA-256). Deserialization validates
/// the format, so a persisted registry with a corrupted id fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Hash an external address into its participant identifier.
    #[must_use]
    pub fn from_address(address: &str) -> Self {
        let digest = Sha256::digest(address.as_bytes());
        Self(hex::encode(digest))
    }

    /// Accept an already-computed digest, validating its shape.
    pub fn from_hex(digest: &str) -> Result<Self, AuctionError> {
        let valid = digest.len() == constants::PARTICIPANT_DIGEST_HEX_LEN
            && digest
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(AuctionError::malformed(format!(
                "participant digest must be {} lowercase hex chars, got {digest:?}",
                constants::PARTICIPANT_DIGEST_HEX_LEN
            )));
        }
        Ok(Self(digest.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight hex chars, for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = AuctionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RoundId
// ---------------------------------------------------------------------------

/// Caller-chosen identifier of an auction round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(pub String);

impl RoundId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = ParticipantId::from_address("buyer1");
        let b = ParticipantId::from_address("buyer1");
        assert_eq!(a, b);
        assert_ne!(a, ParticipantId::from_address("buyer2"));
    }

    #[test]
    fn digest_has_fixed_length() {
        let id = ParticipantId::from_address("");
        assert_eq!(id.as_str().len(), 64);
        // SHA-256 of the empty string.
        assert_eq!(
            id.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn from_hex_accepts_own_output() {
        let id = ParticipantId::from_address("seller7");
        let back = ParticipantId::from_hex(id.as_str()).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn from_hex_rejects_bad_digests() {
        assert!(ParticipantId::from_hex("abc").is_err());
        let upper = "E".repeat(64);
        assert!(ParticipantId::from_hex(&upper).is_err());
        let non_hex = "g".repeat(64);
        assert!(ParticipantId::from_hex(&non_hex).is_err());
    }

    #[test]
    fn short_is_prefix() {
        let id = ParticipantId::from_address("alice");
        assert!(id.as_str().starts_with(id.short()));
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn serde_validates_on_load() {
        let id = ParticipantId::from_address("alice");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let bad: Result<ParticipantId, _> = serde_json::from_str("\"alice\"");
        assert!(bad.is_err());
    }

    #[test]
    fn round_id_display() {
        assert_eq!(RoundId::new("r7").to_string(), "round:r7");
    }
}
