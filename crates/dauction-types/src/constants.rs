//! System-wide constants for the Dauction engine.

/// Caller allowed to initialize the account registry unless configured otherwise.
pub const DEFAULT_PRIVILEGED_CALLER: &str = "auctioneer";

/// Default upper bound on a single bid's quantity.
pub const DEFAULT_MAX_BID_QUANTITY: u64 = 1_000_000;

/// Length of a participant digest in hex characters (SHA-256).
pub const PARTICIPANT_DIGEST_HEX_LEN: usize = 64;

/// Store key holding the account registry.
pub const REGISTRY_KEY: &str = "registry";

/// Prefix of store keys holding rounds (`round:<id>`).
pub const ROUND_KEY_PREFIX: &str = "round:";

/// Separator of multi-value price/quantity encodings.
pub const LIST_SEPARATOR: char = ',';

/// Domain tag mixed into the settlement root hash.
pub const SETTLEMENT_ROOT_DOMAIN: &[u8] = b"dauction:settlement_root:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Dauction";
