// rpc.rs - JSON-RPC handler backed by the certificate authority
use jsonrpsee::core::RpcResult;
use tracing::{debug, error};

use educhain_common::error::EduChainError;
use educhain_ledger::{BlockInfo, ChainStats, VerificationReport};
use educhain_rpc::{
    rpc_error, CertificateEntryResponse, ChainValidationResponse, EduChainApiServer,
    IssueCertificateRequest, IssueCertificateResponse,
};

use crate::authority::CertificateAuthority;

pub struct EduChainRpcHandler {
    authority: CertificateAuthority,
}

impl EduChainRpcHandler {
    pub fn new(authority: CertificateAuthority) -> Self {
        Self { authority }
    }
}

fn entries(list: Vec<educhain_ledger::CertificateEntry>) -> Vec<CertificateEntryResponse> {
    list.into_iter().map(CertificateEntryResponse::from).collect()
}

#[async_trait::async_trait]
impl EduChainApiServer for EduChainRpcHandler {
    async fn issue(&self, req: IssueCertificateRequest) -> RpcResult<IssueCertificateResponse> {
        req.validate().map_err(rpc_error)?;

        // Mining is CPU-bound; keep it off the async workers
        let authority = self.authority.clone();
        let draft = req.to_draft();
        let issued = tokio::task::spawn_blocking(move || authority.issue(draft))
            .await
            .map_err(|e| {
                error!("Issuance task failed: {}", e);
                rpc_error(EduChainError::internal(format!("issuance task failed: {}", e)))
            })?
            .map_err(rpc_error)?;

        Ok(IssueCertificateResponse {
            certificate: issued.record.view(),
            block: issued.block.info(),
        })
    }

    async fn verify(&self, certificate_id: String) -> RpcResult<VerificationReport> {
        debug!(certificate_id = %certificate_id, "Verify request");
        Ok(self.authority.verify(&certificate_id))
    }

    async fn get_certificate(
        &self,
        certificate_id: String,
    ) -> RpcResult<Option<CertificateEntryResponse>> {
        Ok(self
            .authority
            .get_by_id(&certificate_id)
            .map(CertificateEntryResponse::from))
    }

    async fn search_by_student(&self, name: String) -> RpcResult<Vec<CertificateEntryResponse>> {
        Ok(entries(self.authority.search_by_student(&name)))
    }

    async fn search_by_institution(
        &self,
        name: String,
    ) -> RpcResult<Vec<CertificateEntryResponse>> {
        Ok(entries(self.authority.search_by_institution(&name)))
    }

    async fn list_certificates(&self) -> RpcResult<Vec<CertificateEntryResponse>> {
        Ok(entries(self.authority.list_all()))
    }

    async fn stats(&self) -> RpcResult<ChainStats> {
        Ok(self.authority.stats())
    }

    async fn chain(&self) -> RpcResult<Vec<BlockInfo>> {
        Ok(self.authority.full_chain())
    }

    async fn validate(&self) -> RpcResult<ChainValidationResponse> {
        Ok(self.authority.validate_chain().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use educhain_ledger::NOT_FOUND_MESSAGE;
    use educhain_rpc::CHAIN_VALID_MESSAGE;
    use jsonrpsee::types::error::INVALID_PARAMS_CODE;

    fn handler() -> EduChainRpcHandler {
        let config = NodeConfig {
            difficulty: 1,
            ..Default::default()
        };
        EduChainRpcHandler::new(CertificateAuthority::new(&config).unwrap())
    }

    fn request(student: &str, institution: &str) -> IssueCertificateRequest {
        IssueCertificateRequest {
            student_name: student.to_string(),
            institution_name: institution.to_string(),
            course_name: "CS101".to_string(),
            grade: "A".to_string(),
            issue_date: "2023-01-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let handler = handler();
        let issued = handler.issue(request("Alice", "MIT")).await.unwrap();
        assert_eq!(issued.block.index, 1);
        assert!(issued.block.hash.starts_with('0'));

        let report = handler
            .verify(issued.certificate.certificate_id.clone())
            .await
            .unwrap();
        assert!(report.is_valid);

        let entry = handler
            .get_certificate(issued.certificate.certificate_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.block_index, 1);
    }

    #[tokio::test]
    async fn test_issue_rejects_missing_field() {
        let handler = handler();
        let mut req = request("Alice", "MIT");
        req.grade = String::new();

        let err = handler.issue(req).await.unwrap_err();
        assert_eq!(err.code(), INVALID_PARAMS_CODE);
        assert_eq!(handler.stats().await.unwrap().block_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_certificate() {
        let handler = handler();
        let report = handler.verify("CERT-DOESNOTEXIST".to_string()).await.unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.message, NOT_FOUND_MESSAGE);
        assert!(handler
            .get_certificate("CERT-DOESNOTEXIST".to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_and_listing() {
        let handler = handler();
        handler.issue(request("Alice Smith", "MIT")).await.unwrap();
        handler.issue(request("Bob", "Stanford")).await.unwrap();
        handler.issue(request("alice jones", "Harvard")).await.unwrap();

        let found = handler.search_by_student("ALICE".to_string()).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].certificate.student_name, "Alice Smith");

        let found = handler
            .search_by_institution("stan".to_string())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(handler.list_certificates().await.unwrap().len(), 3);
        assert_eq!(handler.chain().await.unwrap().len(), 4);

        let validation = handler.validate().await.unwrap();
        assert!(validation.is_valid);
        assert_eq!(validation.message, CHAIN_VALID_MESSAGE);
    }
}
