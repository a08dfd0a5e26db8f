//! The append-only certificate ledger

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use educhain_common::{
    error::{EduChainError, EduChainResult},
    types::{
        ledger::{
            DEFAULT_DIFFICULTY, DEFAULT_GENESIS_MESSAGE, GENESIS_PREVIOUS_HASH, MAX_DIFFICULTY,
        },
        BlockIndex, HashHex,
    },
};

use crate::block::{Block, BlockInfo, BlockPayload};
use crate::certificate::{CertificateDraft, CertificateRecord, CertificateView, StoredCertificate};
use crate::clock::{Clock, MonotonicClock, SystemClock};

/// Message for a verified certificate
pub const VERIFIED_MESSAGE: &str = "Certificate is authentic and verified";
/// Message for a certificate whose stored fields no longer match its hash
pub const TAMPERED_MESSAGE: &str = "Certificate data has been tampered with";
/// Message for an unknown certificate id
pub const NOT_FOUND_MESSAGE: &str = "Certificate not found in blockchain";

/// A certificate located in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateEntry {
    pub record: CertificateRecord,
    pub block: BlockInfo,
    pub block_index: BlockIndex,
}

/// Outcome of [`Ledger::verify`].
///
/// `is_valid` reflects the record's own integrity hash only. Chain linkage
/// is reported separately by [`Ledger::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub is_valid: bool,
    pub message: String,
    pub certificate: Option<CertificateView>,
    pub block: Option<BlockInfo>,
}

/// Aggregated ledger figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    pub block_count: usize,
    pub certificate_count: usize,
    pub distinct_institution_count: usize,
    pub difficulty: usize,
    pub chain_is_valid: bool,
    pub latest_hash: HashHex,
}

/// Why a chain pass stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainFailureReason {
    /// Stored block hash differs from a recomputation
    HashMismatch,
    /// `previous_hash` differs from the prior block's hash
    BrokenLink,
}

/// First failing block of a chain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainFailure {
    pub index: BlockIndex,
    pub reason: ChainFailureReason,
}

/// Result of a full chain pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub is_valid: bool,
    pub block_count: usize,
    pub failure: Option<ChainFailure>,
}

/// Ordered, append-only block sequence with a fixed mining difficulty
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    difficulty: usize,
    clock: MonotonicClock,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::build(
            DEFAULT_DIFFICULTY,
            DEFAULT_GENESIS_MESSAGE,
            Arc::new(SystemClock),
        )
    }
}

impl Ledger {
    /// Genesis-only ledger on the system clock
    pub fn new(difficulty: usize) -> EduChainResult<Self> {
        Self::with_clock(difficulty, DEFAULT_GENESIS_MESSAGE, Arc::new(SystemClock))
    }

    /// Genesis-only ledger with an explicit genesis message and time source
    pub fn with_clock(
        difficulty: usize,
        genesis_message: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> EduChainResult<Self> {
        Self::check_difficulty(difficulty)?;
        Ok(Self::build(difficulty, genesis_message, clock))
    }

    /// Rebuild a ledger around an existing block sequence.
    ///
    /// Nothing is repaired or rejected beyond emptiness; call
    /// [`Ledger::validate`] to audit the result.
    pub fn from_blocks(blocks: Vec<Block>, difficulty: usize) -> EduChainResult<Self> {
        Self::check_difficulty(difficulty)?;
        if blocks.is_empty() {
            return Err(EduChainError::invalid_input(
                "A ledger needs at least a genesis block",
            ));
        }

        let newest = blocks.iter().map(|b| b.timestamp).max().unwrap_or_default();
        Ok(Self {
            chain: blocks,
            difficulty,
            clock: MonotonicClock::starting_at(Arc::new(SystemClock), newest),
        })
    }

    fn build(difficulty: usize, genesis_message: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let clock = MonotonicClock::new(clock);
        let timestamp = clock.next();
        let genesis = Block::new(
            0,
            timestamp,
            BlockPayload::genesis(genesis_message, timestamp),
            GENESIS_PREVIOUS_HASH,
        );
        info!(difficulty, hash = %genesis.hash, "Genesis block created");

        Self {
            chain: vec![genesis],
            difficulty,
            clock,
        }
    }

    fn check_difficulty(difficulty: usize) -> EduChainResult<()> {
        if difficulty > MAX_DIFFICULTY {
            return Err(EduChainError::config(format!(
                "difficulty {} exceeds hash width {}",
                difficulty, MAX_DIFFICULTY
            )));
        }
        Ok(())
    }

    /// A fresh, genesis-only ledger sharing this ledger's difficulty and time source
    pub fn fresh_like(&self, genesis_message: impl Into<String>) -> Self {
        Self::build(self.difficulty, genesis_message, self.clock.source())
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: genesis is present from construction
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn genesis(&self) -> &Block {
        &self.chain[0]
    }

    pub fn latest_block(&self) -> &Block {
        &self.chain[self.chain.len() - 1]
    }

    /// Stamp `draft` with the ledger clock and append it
    pub fn issue(&mut self, draft: CertificateDraft) -> EduChainResult<Block> {
        let record = self.create_record(draft)?;
        self.append(record)
    }

    /// Build a record whose `created_at` comes from the ledger clock
    pub fn create_record(&self, draft: CertificateDraft) -> EduChainResult<CertificateRecord> {
        CertificateRecord::create(draft, self.clock.next())
    }

    /// Mine `record` into a new block and push it; the only way the chain grows
    pub fn append(&mut self, record: CertificateRecord) -> EduChainResult<Block> {
        let mut candidate = self.prepare(&record)?;
        candidate.mine(self.difficulty);
        self.commit(candidate.clone())?;
        Ok(candidate)
    }

    /// Unmined candidate extending the current tail
    pub fn prepare(&self, record: &CertificateRecord) -> EduChainResult<Block> {
        if !record.is_valid() {
            warn!(
                certificate_id = record.certificate_id(),
                "Rejected invalid certificate"
            );
            return Err(EduChainError::invalid_input("Invalid certificate data"));
        }

        Ok(Block::new(
            self.chain.len() as BlockIndex,
            self.clock.next(),
            BlockPayload::Certificate(record.to_storable()),
            self.latest_block().hash.clone(),
        ))
    }

    /// Publish a mined candidate.
    ///
    /// The candidate must sit at the next index, link to the current tail,
    /// hash correctly at this ledger's difficulty and carry a valid
    /// certificate. A candidate built against an older tail fails with
    /// [`EduChainError::StaleBlock`] and leaves the chain untouched.
    pub fn commit(&mut self, block: Block) -> EduChainResult<()> {
        let tail = self.latest_block();
        if block.index != self.chain.len() as BlockIndex || block.previous_hash != tail.hash {
            return Err(EduChainError::stale_block(format!(
                "block {} does not extend tail {} ({})",
                block.index, tail.index, tail.hash
            )));
        }

        let Some(stored) = block.payload.as_certificate() else {
            return Err(EduChainError::invalid_input(
                "Only certificate blocks can be appended",
            ));
        };
        if !CertificateRecord::from_storable(stored).is_valid() {
            return Err(EduChainError::invalid_input("Invalid certificate data"));
        }
        if !block.is_valid() || !block.meets_difficulty(self.difficulty) {
            return Err(EduChainError::invalid_input(format!(
                "block {} is not mined at difficulty {}",
                block.index, self.difficulty
            )));
        }

        info!(
            index = block.index,
            certificate_id = %stored.certificate_id,
            hash = %block.hash,
            "Certificate added to blockchain"
        );
        self.chain.push(block);
        Ok(())
    }

    /// Certificate blocks in ledger order, genesis skipped
    fn certificate_blocks(&self) -> impl Iterator<Item = (usize, &Block, &StoredCertificate)> + '_ {
        self.chain
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, block)| block.payload.as_certificate().map(|s| (i, block, s)))
    }

    fn entry(index: usize, block: &Block, stored: &StoredCertificate) -> CertificateEntry {
        CertificateEntry {
            record: CertificateRecord::from_storable(stored),
            block: block.info(),
            block_index: index as BlockIndex,
        }
    }

    /// First (oldest) certificate with exactly this id
    pub fn find_by_id(&self, certificate_id: &str) -> Option<CertificateEntry> {
        self.certificate_blocks()
            .find(|(_, _, stored)| stored.certificate_id == certificate_id)
            .map(|(i, block, stored)| Self::entry(i, block, stored))
    }

    /// Case-insensitive substring match on the student name, oldest first
    pub fn find_by_student(&self, query: &str) -> Vec<CertificateEntry> {
        self.search(query, |stored| &stored.student_name)
    }

    /// Case-insensitive substring match on the institution name, oldest first
    pub fn find_by_institution(&self, query: &str) -> Vec<CertificateEntry> {
        self.search(query, |stored| &stored.institution_name)
    }

    fn search<F>(&self, query: &str, field: F) -> Vec<CertificateEntry>
    where
        F: Fn(&StoredCertificate) -> &String,
    {
        let needle = query.to_lowercase();
        self.certificate_blocks()
            .filter(|(_, _, stored)| field(stored).to_lowercase().contains(&needle))
            .map(|(i, block, stored)| Self::entry(i, block, stored))
            .collect()
    }

    pub fn all_certificates(&self) -> Vec<CertificateEntry> {
        self.certificate_blocks()
            .map(|(i, block, stored)| Self::entry(i, block, stored))
            .collect()
    }

    /// Fail-closed pass over every non-genesis block
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid
    }

    /// Same pass as [`Ledger::is_valid`], reporting where it stopped
    pub fn validate(&self) -> ChainReport {
        let failure = self
            .chain
            .windows(2)
            .enumerate()
            .find_map(|(i, pair)| {
                let (previous, current) = (&pair[0], &pair[1]);
                let reason = if !current.is_valid() {
                    ChainFailureReason::HashMismatch
                } else if current.previous_hash != previous.hash {
                    ChainFailureReason::BrokenLink
                } else {
                    return None;
                };
                Some(ChainFailure {
                    index: (i + 1) as BlockIndex,
                    reason,
                })
            });

        if let Some(failure) = &failure {
            warn!(index = failure.index, reason = ?failure.reason, "Chain validation failed");
        }

        ChainReport {
            is_valid: failure.is_none(),
            block_count: self.chain.len(),
            failure,
        }
    }

    /// Look up `certificate_id` and check the record's own integrity hash.
    ///
    /// Block hashes and chain linkage are not consulted here.
    pub fn verify(&self, certificate_id: &str) -> VerificationReport {
        match self.find_by_id(certificate_id) {
            None => VerificationReport {
                is_valid: false,
                message: NOT_FOUND_MESSAGE.to_string(),
                certificate: None,
                block: None,
            },
            Some(entry) => {
                let is_valid = entry.record.is_valid();
                VerificationReport {
                    is_valid,
                    message: if is_valid {
                        VERIFIED_MESSAGE
                    } else {
                        TAMPERED_MESSAGE
                    }
                    .to_string(),
                    certificate: Some(entry.record.view()),
                    block: Some(entry.block),
                }
            }
        }
    }

    pub fn stats(&self) -> ChainStats {
        let mut certificate_count = 0;
        let mut institutions = HashSet::new();
        for (_, _, stored) in self.certificate_blocks() {
            certificate_count += 1;
            institutions.insert(stored.institution_name.as_str());
        }

        ChainStats {
            block_count: self.chain.len(),
            certificate_count,
            distinct_institution_count: institutions.len(),
            difficulty: self.difficulty,
            chain_is_valid: self.is_valid(),
            latest_hash: self.latest_block().hash.clone(),
        }
    }

    pub fn full_chain(&self) -> Vec<BlockInfo> {
        self.chain.iter().map(Block::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const START: u64 = 1_672_531_200_000;

    fn ledger() -> Ledger {
        Ledger::with_clock(2, DEFAULT_GENESIS_MESSAGE, Arc::new(ManualClock::new(START))).unwrap()
    }

    fn draft(student: &str, institution: &str) -> CertificateDraft {
        CertificateDraft::new(student, institution, "CS101", "A", "2023-01-01")
    }

    #[test]
    fn test_new_ledger_is_genesis_only() {
        let ledger = ledger();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty());

        let genesis = ledger.genesis();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, "0");
        assert!(genesis.payload.is_genesis());
        assert!(ledger.is_valid());
        assert!(ledger.all_certificates().is_empty());
    }

    #[test]
    fn test_rejects_impossible_difficulty() {
        assert!(Ledger::new(65).is_err());
        assert!(Ledger::new(0).is_ok());
    }

    #[test]
    fn test_default_uses_difficulty_two() {
        assert_eq!(Ledger::default().difficulty(), 2);
    }

    #[test]
    fn test_issue_links_to_genesis() {
        let mut ledger = ledger();
        let genesis_hash = ledger.genesis().hash.clone();

        let block = ledger.issue(draft("Alice", "MIT")).unwrap();
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, genesis_hash);
        assert!(block.hash.starts_with("00"));
        assert!(block.is_valid());
        assert_eq!(ledger.latest_block(), &block);
    }

    #[test]
    fn test_append_many() {
        let mut ledger = ledger();
        let mut ids = Vec::new();
        for i in 0..5 {
            let block = ledger.issue(draft(&format!("Student {}", i), "MIT")).unwrap();
            ids.push(block.payload.as_certificate().unwrap().certificate_id.clone());
        }

        assert_eq!(ledger.len(), 6);
        assert!(ledger.is_valid());
        assert_eq!(ledger.all_certificates().len(), 5);
        for (i, id) in ids.iter().enumerate() {
            let entry = ledger.find_by_id(id).unwrap();
            assert_eq!(entry.block_index, (i + 1) as u64);
            assert_eq!(entry.record.certificate_id(), id);
        }
    }

    #[test]
    fn test_append_rejects_invalid_record() {
        let mut ledger = ledger();
        let record = ledger.create_record(draft("Alice", "MIT")).unwrap();
        let mut stored = record.to_storable();
        stored.grade = "F".to_string();
        let tampered = CertificateRecord::from_storable(&stored);

        let err = ledger.append(tampered).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_created_at_is_monotonic() {
        let clock = Arc::new(ManualClock::new(START));
        let mut ledger =
            Ledger::with_clock(1, DEFAULT_GENESIS_MESSAGE, clock.clone()).unwrap();

        ledger.issue(draft("Alice", "MIT")).unwrap();
        clock.set(START - 10_000);
        ledger.issue(draft("Bob", "MIT")).unwrap();

        let all = ledger.all_certificates();
        assert!(all[1].record.created_at() >= all[0].record.created_at());
        assert!(all[1].block.timestamp >= all[0].block.timestamp);
    }

    #[test]
    fn test_in_place_tampering_detected() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();
        ledger.issue(draft("Bob", "Stanford")).unwrap();
        assert!(ledger.is_valid());

        if let BlockPayload::Certificate(stored) = &mut ledger.chain[1].payload {
            stored.student_name = "Mallory".to_string();
        }

        assert!(!ledger.chain[1].is_valid());
        assert!(!ledger.is_valid());
        let report = ledger.validate();
        assert_eq!(
            report.failure,
            Some(ChainFailure {
                index: 1,
                reason: ChainFailureReason::HashMismatch
            })
        );
    }

    #[test]
    fn test_rehashed_block_breaks_link() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();
        ledger.issue(draft("Bob", "MIT")).unwrap();

        // Re-mine block 1 after tampering so its own hash is consistent again
        let block = &mut ledger.chain[1];
        block.timestamp += 1;
        block.hash = block.compute_hash();
        block.mine(2);

        assert!(ledger.chain[1].is_valid());
        let report = ledger.validate();
        assert!(!report.is_valid);
        assert_eq!(report.failure.unwrap().index, 2);
        assert_eq!(report.failure.unwrap().reason, ChainFailureReason::BrokenLink);
    }

    #[test]
    fn test_duplicate_id_earliest_wins() {
        let mut ledger = ledger();
        ledger
            .issue(draft("Alice", "MIT").with_certificate_id("CERT-DUPLICATE0001"))
            .unwrap();
        ledger
            .issue(draft("Bob", "Harvard").with_certificate_id("CERT-DUPLICATE0001"))
            .unwrap();

        let entry = ledger.find_by_id("CERT-DUPLICATE0001").unwrap();
        assert_eq!(entry.block_index, 1);
        assert_eq!(entry.record.student_name(), "Alice");
    }

    #[test]
    fn test_search_is_case_insensitive_and_ordered() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice Smith", "MIT")).unwrap();
        ledger.issue(draft("Bob Jones", "Stanford University")).unwrap();
        ledger.issue(draft("alice cooper", "University of Michigan")).unwrap();

        let by_student = ledger.find_by_student("ALICE");
        assert_eq!(by_student.len(), 2);
        assert_eq!(by_student[0].record.student_name(), "Alice Smith");
        assert_eq!(by_student[1].record.student_name(), "alice cooper");

        let by_institution = ledger.find_by_institution("university");
        assert_eq!(by_institution.len(), 2);
        assert!(by_institution[0].block_index < by_institution[1].block_index);

        assert!(ledger.find_by_student("zed").is_empty());
        assert_eq!(ledger.find_by_student("").len(), 3);
    }

    #[test]
    fn test_verify_outcomes() {
        let mut ledger = ledger();
        let block = ledger.issue(draft("Alice", "MIT")).unwrap();
        let id = block.payload.as_certificate().unwrap().certificate_id.clone();

        let report = ledger.verify(&id);
        assert!(report.is_valid);
        assert_eq!(report.message, VERIFIED_MESSAGE);
        assert_eq!(report.block.unwrap().index, 1);

        let missing = ledger.verify("CERT-DOESNOTEXIST");
        assert!(!missing.is_valid);
        assert!(missing.message.contains("not found"));
        assert!(missing.certificate.is_none());

        if let BlockPayload::Certificate(stored) = &mut ledger.chain[1].payload {
            stored.grade = "A+".to_string();
        }
        let tampered = ledger.verify(&id);
        assert!(!tampered.is_valid);
        assert_eq!(tampered.message, TAMPERED_MESSAGE);
    }

    #[test]
    fn test_stats() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();
        ledger.issue(draft("Bob", "MIT")).unwrap();
        ledger.issue(draft("Carol", "Stanford")).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.block_count, 4);
        assert_eq!(stats.certificate_count, 3);
        assert_eq!(stats.distinct_institution_count, 2);
        assert_eq!(stats.difficulty, 2);
        assert!(stats.chain_is_valid);
        assert_eq!(stats.latest_hash, ledger.latest_block().hash);

        assert_eq!(ledger.stats(), stats);
    }

    #[test]
    fn test_commit_rejects_stale_candidate() {
        let mut ledger = ledger();
        let first = ledger.create_record(draft("Alice", "MIT")).unwrap();
        let second = ledger.create_record(draft("Bob", "MIT")).unwrap();

        let mut stale = ledger.prepare(&second).unwrap();
        stale.mine(2);
        ledger.append(first).unwrap();

        let err = ledger.commit(stale).unwrap_err();
        assert!(matches!(err, EduChainError::StaleBlock(_)));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.is_valid());
    }

    #[test]
    fn test_commit_rejects_unmined_block() {
        let mut ledger = ledger();
        let record = ledger.create_record(draft("Alice", "MIT")).unwrap();
        let mut candidate = ledger.prepare(&record).unwrap();
        while candidate.meets_difficulty(2) {
            candidate.nonce += 1;
            candidate.hash = candidate.compute_hash();
        }

        assert!(ledger.commit(candidate).unwrap_err().is_invalid_input());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_from_blocks_round_trip_and_empty() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();

        let rebuilt = Ledger::from_blocks(ledger.blocks().to_vec(), 2).unwrap();
        assert!(rebuilt.is_valid());
        assert_eq!(rebuilt.stats(), ledger.stats());

        assert!(Ledger::from_blocks(Vec::new(), 2).is_err());
    }

    #[test]
    fn test_fresh_like_resets_to_genesis() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();

        let fresh = ledger.fresh_like("Reset");
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh.difficulty(), 2);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_append_is_logged() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();
        assert!(logs_contain("Certificate added to blockchain"));
    }

    #[test]
    fn test_full_chain_snapshots_every_block() {
        let mut ledger = ledger();
        ledger.issue(draft("Alice", "MIT")).unwrap();
        let chain = ledger.full_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].previous_hash, chain[0].hash);
    }
}
