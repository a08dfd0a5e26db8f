// lib.rs - EduChain Core Library
//! # EduChain Core
//!
//! The node side of EduChain: a certificate authority owning one
//! proof-of-work ledger, its configuration, and the JSON-RPC handler that
//! exposes it.
//!
//! ## Architecture
//!
//! - **CertificateAuthority**: shared handle; issuance is serialized, mining
//!   runs outside the ledger lock, queries read a consistent snapshot
//! - **NodeConfig**: RPC address, difficulty and genesis message, loadable
//!   from TOML, YAML or JSON
//! - **EduChainRpcHandler**: `educhain_*` JSON-RPC methods over the authority
//!
//! ## Example
//!
//! ```no_run
//! use educhain_core::{CertificateAuthority, EduChainRpcHandler, NodeConfig};
//! use educhain_rpc::{start_server, RpcConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::default();
//!     let authority = CertificateAuthority::new(&config)?;
//!
//!     let rpc = RpcConfig { listen_addr: config.listen_addr()? };
//!     start_server(rpc, EduChainRpcHandler::new(authority)).await?;
//!     Ok(())
//! }
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

/// Ledger ownership and issuance
pub mod authority;

/// Configuration module
pub mod config;

/// JSON-RPC handler
pub mod rpc;

pub use authority::{CertificateAuthority, IssuedCertificate};
pub use config::{NodeConfig, MAX_NODE_DIFFICULTY};
pub use rpc::EduChainRpcHandler;

/// EduChain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
