//! # EduChain RPC - JSON-RPC API Server
//!
//! This crate provides the JSON-RPC 2.0 API of an EduChain node. It is a
//! thin surface: every method forwards to the certificate authority in
//! `educhain-core` and adds no ledger logic of its own.
//!
//! ## API Overview
//!
//! ### Issuance
//! - **`educhain_issue`**: Validate, mine and append a certificate
//!
//! ### Certificate Queries
//! - **`educhain_verify`**: Check a certificate's integrity hash
//! - **`educhain_getCertificate`**: Fetch a certificate with its block
//! - **`educhain_searchByStudent`** / **`educhain_searchByInstitution`**:
//!   Case-insensitive substring search, oldest first
//! - **`educhain_listCertificates`**: Every certificate in ledger order
//!
//! ### Chain Information
//! - **`educhain_stats`**: Block and certificate counts, latest hash
//! - **`educhain_chain`**: Every block snapshot
//! - **`educhain_validate`**: Full hash-link pass over the chain
//!
//! ## Example Usage
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "method": "educhain_issue",
//!   "params": [{
//!     "studentName": "Alice",
//!     "institutionName": "MIT",
//!     "courseName": "CS101",
//!     "grade": "A",
//!     "issueDate": "2023-01-01"
//!   }],
//!   "id": 1
//! }
//! ```
//!
//! Note that `educhain_verify` only checks the certificate record's own
//! hash. Pair it with `educhain_validate` to confirm the chain around it is
//! intact.

use std::net::SocketAddr;

use jsonrpsee::{
    core::RpcResult,
    proc_macros::rpc,
    server::{ServerBuilder, ServerHandle},
    types::{
        error::{INTERNAL_ERROR_CODE, INVALID_PARAMS_CODE},
        ErrorObject, ErrorObjectOwned,
    },
};
use serde::{Deserialize, Serialize};

use educhain_common::{
    error::{EduChainError, EduChainResult},
    types::BlockIndex,
};
use educhain_ledger::{
    BlockInfo, CertificateDraft, CertificateEntry, CertificateView, ChainFailure, ChainReport,
    ChainStats, VerificationReport,
};

/// Message for a chain that passed validation
pub const CHAIN_VALID_MESSAGE: &str = "Blockchain is valid and secure";
/// Message for a chain that failed validation
pub const CHAIN_INVALID_MESSAGE: &str = "Blockchain integrity compromised";

/// Request to issue a certificate
///
/// All five fields are required and must be non-empty; `issueDate` is a
/// `YYYY-MM-DD` calendar date. The certificate id is always generated by
/// the node.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    pub student_name: String,
    pub institution_name: String,
    pub course_name: String,
    pub grade: String,
    pub issue_date: String,
}

impl IssueCertificateRequest {
    /// Reject missing fields and bad dates before anything is hashed
    ///
    /// # Example
    ///
    /// ```
    /// use educhain_rpc::IssueCertificateRequest;
    ///
    /// let req = IssueCertificateRequest {
    ///     student_name: "Alice".to_string(),
    ///     institution_name: "MIT".to_string(),
    ///     course_name: "CS101".to_string(),
    ///     grade: "A".to_string(),
    ///     issue_date: "2023-01-01".to_string(),
    /// };
    /// assert!(req.validate().is_ok());
    /// ```
    pub fn validate(&self) -> EduChainResult<()> {
        self.to_draft().validate()
    }

    pub fn to_draft(&self) -> CertificateDraft {
        CertificateDraft::new(
            self.student_name.clone(),
            self.institution_name.clone(),
            self.course_name.clone(),
            self.grade.clone(),
            self.issue_date.clone(),
        )
    }
}

/// Response from issuing a certificate
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateResponse {
    pub certificate: CertificateView,
    pub block: BlockInfo,
}

/// A certificate together with the block that holds it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntryResponse {
    pub certificate: CertificateView,
    pub block: BlockInfo,
    pub block_index: BlockIndex,
}

impl From<CertificateEntry> for CertificateEntryResponse {
    fn from(entry: CertificateEntry) -> Self {
        Self {
            certificate: entry.record.view(),
            block: entry.block,
            block_index: entry.block_index,
        }
    }
}

/// Full-chain validation outcome
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainValidationResponse {
    pub is_valid: bool,
    pub message: String,
    pub block_count: usize,
    pub failure: Option<ChainFailure>,
}

impl From<ChainReport> for ChainValidationResponse {
    fn from(report: ChainReport) -> Self {
        Self {
            is_valid: report.is_valid,
            message: if report.is_valid {
                CHAIN_VALID_MESSAGE
            } else {
                CHAIN_INVALID_MESSAGE
            }
            .to_string(),
            block_count: report.block_count,
            failure: report.failure,
        }
    }
}

/// Main EduChain JSON-RPC API trait
///
/// All methods are async and return [`RpcResult`], which handles JSON-RPC
/// error responses and serialization.
#[rpc(server)]
pub trait EduChainApi {
    /// Issue a new certificate
    ///
    /// Validates the request, mines a block for it at the ledger's
    /// difficulty and appends it. Fails with invalid-params when any field
    /// is missing or the date does not parse.
    #[method(name = "educhain_issue")]
    async fn issue(&self, req: IssueCertificateRequest) -> RpcResult<IssueCertificateResponse>;

    /// Verify a certificate by id
    ///
    /// Unknown ids are not an error: the report comes back with
    /// `isValid: false` and a not-found message.
    #[method(name = "educhain_verify")]
    async fn verify(&self, certificate_id: String) -> RpcResult<VerificationReport>;

    /// Fetch a certificate and its block, `null` if absent
    #[method(name = "educhain_getCertificate")]
    async fn get_certificate(
        &self,
        certificate_id: String,
    ) -> RpcResult<Option<CertificateEntryResponse>>;

    /// Certificates whose student name contains `name`, ignoring case
    #[method(name = "educhain_searchByStudent")]
    async fn search_by_student(&self, name: String) -> RpcResult<Vec<CertificateEntryResponse>>;

    /// Certificates whose institution name contains `name`, ignoring case
    #[method(name = "educhain_searchByInstitution")]
    async fn search_by_institution(
        &self,
        name: String,
    ) -> RpcResult<Vec<CertificateEntryResponse>>;

    /// Every certificate in ledger order
    #[method(name = "educhain_listCertificates")]
    async fn list_certificates(&self) -> RpcResult<Vec<CertificateEntryResponse>>;

    /// Aggregated ledger statistics
    #[method(name = "educhain_stats")]
    async fn stats(&self) -> RpcResult<ChainStats>;

    /// Every block, genesis first
    #[method(name = "educhain_chain")]
    async fn chain(&self) -> RpcResult<Vec<BlockInfo>>;

    /// Run the full hash-link validation pass
    #[method(name = "educhain_validate")]
    async fn validate(&self) -> RpcResult<ChainValidationResponse>;
}

/// Map a core error onto a JSON-RPC error object.
///
/// Caller mistakes become invalid-params; everything else is internal.
pub fn rpc_error(err: EduChainError) -> ErrorObjectOwned {
    let code = if err.is_invalid_input() {
        INVALID_PARAMS_CODE
    } else {
        INTERNAL_ERROR_CODE
    };
    ErrorObject::owned(code, err.to_string(), None::<()>)
}

/// Configuration for the JSON-RPC server
pub struct RpcConfig {
    /// Socket address to bind the server to (IP:port)
    pub listen_addr: SocketAddr,
}

/// Bind and start the server, returning the bound address and its handle
pub async fn spawn_server<T: EduChainApiServer>(
    config: RpcConfig,
    api_impl: T,
) -> EduChainResult<(SocketAddr, ServerHandle)> {
    let server = ServerBuilder::default()
        .build(config.listen_addr)
        .await
        .map_err(|e| EduChainError::network(format!("Failed to build server: {}", e)))?;

    let addr = server
        .local_addr()
        .map_err(|e| EduChainError::network(format!("Failed to get local address: {}", e)))?;
    let handle = server.start(api_impl.into_rpc());

    tracing::info!("RPC server listening on {}", addr);
    Ok((addr, handle))
}

/// Start the JSON-RPC server and serve until it is stopped
pub async fn start_server<T: EduChainApiServer>(
    config: RpcConfig,
    api_impl: T,
) -> EduChainResult<()> {
    let (_, handle) = spawn_server(config, api_impl).await?;
    handle.stopped().await;
    Ok(())
}
