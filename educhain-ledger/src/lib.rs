//! # EduChain Ledger
//!
//! The certificate chain engine: self-hashing certificate records, hash-linked
//! blocks secured by a proof-of-work nonce, and the ledger that appends,
//! validates and queries them.
//!
//! ## Architecture
//!
//! - **CertificateRecord**: immutable value whose integrity hash covers every field
//! - **Block**: index, timestamp, payload and previous hash, mined to a
//!   leading-zero target
//! - **Ledger**: genesis-anchored `Vec<Block>`; one writer, any number of readers
//!
//! ## Example
//!
//! ```
//! use educhain_ledger::{CertificateDraft, Ledger};
//!
//! # fn main() -> educhain_common::error::EduChainResult<()> {
//! let mut ledger = Ledger::new(2)?;
//! let block = ledger.issue(CertificateDraft::new("Alice", "MIT", "CS101", "A", "2023-01-01"))?;
//! assert!(block.hash.starts_with("00"));
//!
//! let id = &block.payload.as_certificate().unwrap().certificate_id;
//! assert!(ledger.verify(id).is_valid);
//! assert!(ledger.is_valid());
//! # Ok(())
//! # }
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

pub mod block;
pub mod certificate;
pub mod chain;
pub mod clock;

pub use block::{Block, BlockInfo, BlockPayload, GenesisMarker};
pub use certificate::{
    generate_certificate_id, CertificateDraft, CertificateRecord, CertificateView,
    StoredCertificate,
};
pub use chain::{
    CertificateEntry, ChainFailure, ChainFailureReason, ChainReport, ChainStats, Ledger,
    VerificationReport, NOT_FOUND_MESSAGE, TAMPERED_MESSAGE, VERIFIED_MESSAGE,
};
pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
