//! Self-hashing certificate records
//!
//! A [`CertificateRecord`] is built once through [`CertificateRecord::create`]
//! and never changes afterwards. Its `integrity_hash` covers every other
//! field, so a record reconstructed from a tampered block payload reports
//! `is_valid() == false`.

use serde::{Deserialize, Serialize};

use educhain_common::{
    crypto::CryptoUtils,
    error::EduChainResult,
    types::{
        certificate::{ID_PREFIX, ID_RANDOM_BYTES},
        millis_to_rfc3339, HashHex, Timestamp,
    },
    validation::{patterns, ValidationUtils},
};

/// Caller-supplied certificate fields, before the ledger stamps and hashes them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDraft {
    pub student_name: String,
    pub institution_name: String,
    pub course_name: String,
    pub grade: String,
    /// Calendar date, `YYYY-MM-DD`
    pub issue_date: String,
    /// Generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}

impl CertificateDraft {
    pub fn new(
        student_name: impl Into<String>,
        institution_name: impl Into<String>,
        course_name: impl Into<String>,
        grade: impl Into<String>,
        issue_date: impl Into<String>,
    ) -> Self {
        Self {
            student_name: student_name.into(),
            institution_name: institution_name.into(),
            course_name: course_name.into(),
            grade: grade.into(),
            issue_date: issue_date.into(),
            certificate_id: None,
        }
    }

    pub fn with_certificate_id(mut self, certificate_id: impl Into<String>) -> Self {
        self.certificate_id = Some(certificate_id.into());
        self
    }

    /// Check every field without hashing anything
    pub fn validate(&self) -> EduChainResult<()> {
        patterns::validate_certificate_fields(
            &self.student_name,
            &self.institution_name,
            &self.course_name,
            &self.grade,
            &self.issue_date,
        )?;
        if let Some(id) = &self.certificate_id {
            ValidationUtils::validate_certificate_id(id)?;
        }
        Ok(())
    }
}

/// One issued certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    certificate_id: String,
    student_name: String,
    institution_name: String,
    course_name: String,
    grade: String,
    issue_date: String,
    created_at: Timestamp,
    integrity_hash: HashHex,
}

impl CertificateRecord {
    /// Validate `draft`, assign an id if needed and fix the integrity hash.
    ///
    /// Business fields are stored exactly as supplied.
    pub fn create(draft: CertificateDraft, created_at: Timestamp) -> EduChainResult<Self> {
        draft.validate()?;

        let certificate_id = draft
            .certificate_id
            .unwrap_or_else(generate_certificate_id);

        let mut record = Self {
            certificate_id,
            student_name: draft.student_name,
            institution_name: draft.institution_name,
            course_name: draft.course_name,
            grade: draft.grade,
            issue_date: draft.issue_date,
            created_at,
            integrity_hash: String::new(),
        };
        record.integrity_hash = record.compute_hash();
        Ok(record)
    }

    /// Digest over id, student, institution, course, grade, issue date and
    /// `created_at` (decimal), in that order.
    pub fn compute_hash(&self) -> HashHex {
        let created_at = self.created_at.to_string();
        CryptoUtils::hash_concat(&[
            self.certificate_id.as_bytes(),
            self.student_name.as_bytes(),
            self.institution_name.as_bytes(),
            self.course_name.as_bytes(),
            self.grade.as_bytes(),
            self.issue_date.as_bytes(),
            created_at.as_bytes(),
        ])
    }

    /// Business fields present and stored hash matches a fresh recomputation
    pub fn is_valid(&self) -> bool {
        let fields_present = [
            &self.student_name,
            &self.institution_name,
            &self.course_name,
            &self.grade,
            &self.issue_date,
        ]
        .iter()
        .all(|field| !field.trim().is_empty());

        fields_present && self.integrity_hash == self.compute_hash()
    }

    /// Flatten into the block payload form; hash and `created_at` are copied, not recomputed
    pub fn to_storable(&self) -> StoredCertificate {
        StoredCertificate {
            certificate_id: self.certificate_id.clone(),
            student_name: self.student_name.clone(),
            institution_name: self.institution_name.clone(),
            course_name: self.course_name.clone(),
            grade: self.grade.clone(),
            issue_date: self.issue_date.clone(),
            created_at: self.created_at,
            integrity_hash: self.integrity_hash.clone(),
        }
    }

    /// Rebuild from a stored payload, keeping the stored hash as-is
    pub fn from_storable(stored: &StoredCertificate) -> Self {
        Self {
            certificate_id: stored.certificate_id.clone(),
            student_name: stored.student_name.clone(),
            institution_name: stored.institution_name.clone(),
            course_name: stored.course_name.clone(),
            grade: stored.grade.clone(),
            issue_date: stored.issue_date.clone(),
            created_at: stored.created_at,
            integrity_hash: stored.integrity_hash.clone(),
        }
    }

    /// Display projection
    pub fn view(&self) -> CertificateView {
        CertificateView {
            certificate_id: self.certificate_id.clone(),
            student_name: self.student_name.clone(),
            institution_name: self.institution_name.clone(),
            course_name: self.course_name.clone(),
            grade: self.grade.clone(),
            issue_date: self.issue_date.clone(),
            issued_timestamp: millis_to_rfc3339(self.created_at),
            certificate_hash: self.integrity_hash.clone(),
            is_valid: self.is_valid(),
        }
    }

    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn institution_name(&self) -> &str {
        &self.institution_name
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn integrity_hash(&self) -> &str {
        &self.integrity_hash
    }
}

/// Certificate fields as they sit inside a block payload.
///
/// Field order and JSON names feed the block hash; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCertificate {
    pub certificate_id: String,
    pub student_name: String,
    pub institution_name: String,
    pub course_name: String,
    pub grade: String,
    pub issue_date: String,
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
    #[serde(rename = "certificateHash")]
    pub integrity_hash: HashHex,
}

/// Human-facing certificate summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    pub certificate_id: String,
    pub student_name: String,
    pub institution_name: String,
    pub course_name: String,
    pub grade: String,
    pub issue_date: String,
    /// RFC 3339 rendering of `created_at`
    pub issued_timestamp: String,
    pub certificate_hash: HashHex,
    pub is_valid: bool,
}

/// `CERT-` followed by 8 OS-random bytes in upper-case hex
pub fn generate_certificate_id() -> String {
    format!(
        "{}{}",
        ID_PREFIX,
        CryptoUtils::random_hex_upper::<ID_RANDOM_BYTES>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CertificateDraft {
        CertificateDraft::new("Alice", "MIT", "CS101", "A", "2023-01-01")
    }

    #[test]
    fn test_fresh_record_is_valid() {
        let record = CertificateRecord::create(alice(), 1_672_531_200_000).unwrap();
        assert!(record.is_valid());
        assert_eq!(record.created_at(), 1_672_531_200_000);
        assert_eq!(record.integrity_hash().len(), 64);
    }

    #[test]
    fn test_integrity_hash_known_answer() {
        let draft = alice().with_certificate_id("CERT-0000000000000001");
        let record = CertificateRecord::create(draft, 1_672_531_200_000).unwrap();
        assert_eq!(
            record.integrity_hash(),
            "7c833e396d9b567e2d76256ba89d6aae08932a39dacaa5b0a8838b55b6c15d13"
        );
    }

    #[test]
    fn test_generated_id_shape() {
        let record = CertificateRecord::create(alice(), 0).unwrap();
        let id = record.certificate_id();
        assert!(id.starts_with("CERT-"));
        assert_eq!(id.len(), 5 + 16);
        assert!(id[5..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

        let other = CertificateRecord::create(alice(), 0).unwrap();
        assert_ne!(record.certificate_id(), other.certificate_id());
    }

    #[test]
    fn test_rejects_blank_fields() {
        let mut draft = alice();
        draft.grade = "   ".to_string();
        let err = CertificateRecord::create(draft, 0).unwrap_err();
        assert!(err.is_invalid_input());

        let mut draft = alice();
        draft.student_name.clear();
        assert!(CertificateRecord::create(draft, 0).is_err());
    }

    #[test]
    fn test_rejects_unparseable_date() {
        let mut draft = alice();
        draft.issue_date = "2023-13-01".to_string();
        assert!(CertificateRecord::create(draft, 0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_rejects_malformed_supplied_id() {
        let draft = alice().with_certificate_id("12345");
        assert!(CertificateRecord::create(draft, 0).is_err());

        let err = CertificateRecord::create(alice().with_certificate_id("CERT-  "), 0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_field_mutation_invalidates() {
        let original = CertificateRecord::create(alice(), 42).unwrap();

        let mut tampered = original.clone();
        tampered.student_name = "Mallory".to_string();
        assert!(!tampered.is_valid());

        let mut tampered = original.clone();
        tampered.grade = "A+".to_string();
        assert!(!tampered.is_valid());

        let mut tampered = original.clone();
        tampered.created_at += 1;
        assert!(!tampered.is_valid());

        let mut tampered = original;
        tampered.institution_name.clear();
        assert!(!tampered.is_valid());
    }

    #[test]
    fn test_storable_round_trip_keeps_hash() {
        let record = CertificateRecord::create(alice(), 7).unwrap();
        let stored = record.to_storable();
        assert_eq!(stored.integrity_hash, record.integrity_hash());
        assert_eq!(stored.created_at, 7);

        let rebuilt = CertificateRecord::from_storable(&stored);
        assert_eq!(rebuilt, record);
        assert!(rebuilt.is_valid());
    }

    #[test]
    fn test_tampered_storable_is_detected() {
        let record = CertificateRecord::create(alice(), 7).unwrap();
        let mut stored = record.to_storable();
        stored.course_name = "CS999".to_string();

        let rebuilt = CertificateRecord::from_storable(&stored);
        assert!(!rebuilt.is_valid());
        assert!(!rebuilt.view().is_valid);
    }

    #[test]
    fn test_view_renders_issue_instant() {
        let record = CertificateRecord::create(alice(), 1_672_531_200_000).unwrap();
        let view = record.view();
        assert_eq!(view.issued_timestamp, "2023-01-01T00:00:00.000Z");
        assert!(view.is_valid);
    }
}
