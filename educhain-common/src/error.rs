//educhain-common/src/error.rs
//! Standardized error types for all EduChain components

use thiserror::Error;

/// Standard result type used throughout EduChain
pub type EduChainResult<T> = std::result::Result<T, EduChainError>;

/// Comprehensive error type for all EduChain operations
///
/// Integrity failures are deliberately absent: a tampered record or block is
/// reported as data (`is_valid == false`), and lookups that miss return
/// `None`.
#[derive(Error, Debug)]
pub enum EduChainError {
    // Rejected caller input (missing fields, bad dates, invalid records)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Candidate block no longer extends the ledger tail
    #[error("Stale block: {0}")]
    StaleBlock(String),

    // Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // I/O errors
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // Node-side failures unrelated to the request, e.g. a crashed worker task
    #[error("Internal error: {0}")]
    Internal(String),

    // External library errors
    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl EduChainError {
    /// Create a new invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new stale-block error
    pub fn stale_block(msg: impl Into<String>) -> Self {
        Self::StaleBlock(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True when the caller can fix the failure by resubmitting corrected data
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
