//! The certificate authority: one owned ledger shared behind locks
//!
//! Issuers are serialized by a dedicated mutex. Mining happens outside the
//! ledger lock on a prepared candidate; only the final `commit` takes the
//! write lock, so readers never wait on proof-of-work and never observe a
//! half-built block.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use educhain_common::error::EduChainResult;
use educhain_ledger::{
    Block, BlockInfo, CertificateDraft, CertificateEntry, CertificateRecord, ChainReport,
    ChainStats, Clock, Ledger, SystemClock, VerificationReport,
};

use crate::config::NodeConfig;

/// A freshly issued certificate and the block that stores it
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub record: CertificateRecord,
    pub block: Block,
}

#[derive(Debug)]
struct AuthorityInner {
    ledger: RwLock<Ledger>,
    issuance: Mutex<()>,
    genesis_message: String,
}

/// Cheaply cloneable handle to the node's ledger
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    inner: Arc<AuthorityInner>,
}

impl CertificateAuthority {
    /// Validate `config` and build a genesis-only ledger on the system clock
    pub fn new(config: &NodeConfig) -> EduChainResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &NodeConfig, clock: Arc<dyn Clock>) -> EduChainResult<Self> {
        config.validate()?;
        let ledger = Ledger::with_clock(config.difficulty, config.genesis_message.clone(), clock)?;
        info!(difficulty = config.difficulty, "Certificate authority initialized");
        Ok(Self::from_ledger(ledger, config.genesis_message.clone()))
    }

    /// Wrap an existing ledger; `reset` will rebuild with `genesis_message`
    pub fn from_ledger(ledger: Ledger, genesis_message: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AuthorityInner {
                ledger: RwLock::new(ledger),
                issuance: Mutex::new(()),
                genesis_message: genesis_message.into(),
            }),
        }
    }

    /// Validate, mine and publish a certificate
    pub fn issue(&self, draft: CertificateDraft) -> EduChainResult<IssuedCertificate> {
        let _issuing = self.inner.issuance.lock();

        let (record, mut candidate, difficulty) = {
            let ledger = self.inner.ledger.read();
            let record = ledger.create_record(draft)?;
            let candidate = ledger.prepare(&record)?;
            (record, candidate, ledger.difficulty())
        };

        candidate.mine(difficulty);
        self.inner.ledger.write().commit(candidate.clone())?;

        Ok(IssuedCertificate {
            record,
            block: candidate,
        })
    }

    pub fn verify(&self, certificate_id: &str) -> VerificationReport {
        self.inner.ledger.read().verify(certificate_id)
    }

    pub fn get_by_id(&self, certificate_id: &str) -> Option<CertificateEntry> {
        self.inner.ledger.read().find_by_id(certificate_id)
    }

    pub fn search_by_student(&self, name: &str) -> Vec<CertificateEntry> {
        self.inner.ledger.read().find_by_student(name)
    }

    pub fn search_by_institution(&self, name: &str) -> Vec<CertificateEntry> {
        self.inner.ledger.read().find_by_institution(name)
    }

    pub fn list_all(&self) -> Vec<CertificateEntry> {
        self.inner.ledger.read().all_certificates()
    }

    pub fn stats(&self) -> ChainStats {
        self.inner.ledger.read().stats()
    }

    pub fn full_chain(&self) -> Vec<BlockInfo> {
        self.inner.ledger.read().full_chain()
    }

    pub fn validate_chain(&self) -> ChainReport {
        self.inner.ledger.read().validate()
    }

    pub fn is_chain_valid(&self) -> bool {
        self.inner.ledger.read().is_valid()
    }

    /// Replace the ledger with a genesis-only one of the same configuration
    pub fn reset(&self) {
        let _issuing = self.inner.issuance.lock();
        let mut ledger = self.inner.ledger.write();
        *ledger = ledger.fresh_like(self.inner.genesis_message.clone());
        info!("Ledger reset to genesis");
    }

    /// Run `f` against a read-locked ledger
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.ledger.read())
    }
}
