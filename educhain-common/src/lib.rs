//! # EduChain Common
//!
//! Common utilities and standardized patterns for the EduChain certificate
//! ledger. This crate is the single source of truth for the error type, the
//! hashing primitive and input validation shared by every other crate.
//!
//! ## Modules
//!
//! - **crypto**: SHA-256 hex digests, leading-zero checks, OS randomness
//! - **error**: `EduChainError` and `EduChainResult`
//! - **validation**: Input validation utilities
//! - **types**: Common type definitions and constants
//!
//! ## Example Usage
//!
//! ```rust
//! use educhain_common::{crypto::CryptoUtils, validation::ValidationUtils};
//!
//! let digest = CryptoUtils::hash_concat(&[b"CERT-", b"0001"]);
//! assert_eq!(digest.len(), 64);
//! assert!(ValidationUtils::require_non_empty("", "grade").is_err());
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

pub mod crypto;
pub mod error;
pub mod types;
pub mod validation;
