//! Hashing and randomness helpers shared by records and blocks

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::types::HashHex;

/// Central cryptographic utilities
pub struct CryptoUtils;

impl CryptoUtils {
    /// Compute SHA-256 of data as lower-case hex
    pub fn sha256_hex(data: &[u8]) -> HashHex {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Hash the byte concatenation of `parts` as lower-case hex.
    ///
    /// Field order is the caller's format contract: reordering parts
    /// produces a different digest.
    pub fn hash_concat(parts: &[&[u8]]) -> HashHex {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hex::encode(hasher.finalize())
    }

    /// True when the first `difficulty` characters of `hash` are all `'0'`
    pub fn has_leading_zeros(hash: &str, difficulty: usize) -> bool {
        hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Fill `N` bytes from the operating system RNG
    pub fn random_bytes<const N: usize>() -> [u8; N] {
        let mut bytes = [0u8; N];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }

    /// Upper-case hex of `N` OS-random bytes
    pub fn random_hex_upper<const N: usize>() -> String {
        hex::encode_upper(Self::random_bytes::<N>())
    }
}
