//! Hash-linked blocks with proof-of-work mining

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use educhain_common::{
    crypto::CryptoUtils,
    types::{ledger::MAX_DIFFICULTY, BlockIndex, HashHex, Nonce, Timestamp},
};

use crate::certificate::StoredCertificate;

/// Genesis payload body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMarker {
    pub message: String,
    pub timestamp: Timestamp,
}

/// Block payload, tagged by `type` in its JSON form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockPayload {
    Genesis(GenesisMarker),
    Certificate(StoredCertificate),
}

impl BlockPayload {
    pub fn genesis(message: impl Into<String>, timestamp: Timestamp) -> Self {
        BlockPayload::Genesis(GenesisMarker {
            message: message.into(),
            timestamp,
        })
    }

    pub fn as_certificate(&self) -> Option<&StoredCertificate> {
        match self {
            BlockPayload::Certificate(stored) => Some(stored),
            BlockPayload::Genesis(_) => None,
        }
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, BlockPayload::Genesis(_))
    }

    /// Compact JSON with the `type` tag first and fields in declaration order
    pub fn canonical_json(&self) -> String {
        // Plain string/integer structs: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: BlockIndex,
    pub timestamp: Timestamp,
    pub payload: BlockPayload,
    pub previous_hash: HashHex,
    pub nonce: Nonce,
    pub hash: HashHex,
}

impl Block {
    /// Build with `nonce = 0` and a provisional hash
    pub fn new(
        index: BlockIndex,
        timestamp: Timestamp,
        payload: BlockPayload,
        previous_hash: impl Into<HashHex>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            payload,
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// `sha256(index ∥ previous_hash ∥ timestamp ∥ json(payload) ∥ nonce)`,
    /// integers in decimal.
    pub fn compute_hash(&self) -> HashHex {
        let index = self.index.to_string();
        let timestamp = self.timestamp.to_string();
        let payload = self.payload.canonical_json();
        let nonce = self.nonce.to_string();
        CryptoUtils::hash_concat(&[
            index.as_bytes(),
            self.previous_hash.as_bytes(),
            timestamp.as_bytes(),
            payload.as_bytes(),
            nonce.as_bytes(),
        ])
    }

    /// Search nonces until the hash has `difficulty` leading `'0'` characters.
    ///
    /// Returns the number of hashes computed. A `difficulty` wider than the
    /// hex digest can never be met, so the block is left untouched and 0 is
    /// returned.
    pub fn mine(&mut self, difficulty: usize) -> u64 {
        if difficulty > MAX_DIFFICULTY {
            warn!(index = self.index, difficulty, "Difficulty exceeds hash width");
            return 0;
        }

        let mut attempts = 0u64;
        while !self.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.hash = self.compute_hash();
            attempts += 1;
        }
        debug!(
            index = self.index,
            nonce = self.nonce,
            attempts,
            "Block mined: {}",
            self.hash
        );
        attempts
    }

    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        CryptoUtils::has_leading_zeros(&self.hash, difficulty)
    }

    /// Stored hash matches a fresh recomputation
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Owned read-only snapshot
    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            index: self.index,
            timestamp: self.timestamp,
            payload: self.payload.clone(),
            previous_hash: self.previous_hash.clone(),
            hash: self.hash.clone(),
            nonce: self.nonce,
        }
    }
}

/// Snapshot of a block for display and transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub index: BlockIndex,
    pub timestamp: Timestamp,
    pub payload: BlockPayload,
    pub previous_hash: HashHex,
    pub hash: HashHex,
    pub nonce: Nonce,
}
