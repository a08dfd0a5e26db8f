//educhain-common/src/types.rs
//! Common type definitions and constants used throughout EduChain

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp in milliseconds since Unix epoch
pub type Timestamp = u64;

/// Position of a block in the ledger (0 = genesis)
pub type BlockIndex = u64;

/// Proof-of-work nonce
pub type Nonce = u64;

/// Lower-case hex SHA-256 digest
pub type HashHex = String;

/// Ledger constants
pub mod ledger {
    /// Difficulty used when none is configured
    pub const DEFAULT_DIFFICULTY: usize = 2;

    /// Width of a hex-encoded SHA-256 digest; no mined hash can exceed it
    pub const MAX_DIFFICULTY: usize = 64;

    /// `previous_hash` sentinel carried by the genesis block
    pub const GENESIS_PREVIOUS_HASH: &str = "0";

    /// Marker text stored in the genesis payload
    pub const DEFAULT_GENESIS_MESSAGE: &str =
        "EduChain Genesis Block - Certificate Verification System";
}

/// Certificate identifier constants
pub mod certificate {
    /// Prefix of every generated certificate id
    pub const ID_PREFIX: &str = "CERT-";

    /// Random bytes hex-encoded into a generated id (16 hex chars)
    pub const ID_RANDOM_BYTES: usize = 8;

    /// Accepted `issue_date` format
    pub const ISSUE_DATE_FORMAT: &str = "%Y-%m-%d";
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis().max(0) as Timestamp
}

/// Render an epoch-millisecond timestamp as RFC 3339 (UTC)
pub fn millis_to_rfc3339(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ts.to_string())
}
