//! Input validation utilities and patterns

use chrono::NaiveDate;

use crate::{
    error::{EduChainError, EduChainResult},
    types::certificate::{ID_PREFIX, ID_RANDOM_BYTES, ISSUE_DATE_FORMAT},
};

/// Validation utilities for common data types
pub struct ValidationUtils;

impl ValidationUtils {
    /// Reject values that are empty after trimming
    pub fn require_non_empty(value: &str, field_name: &str) -> EduChainResult<()> {
        if value.trim().is_empty() {
            return Err(EduChainError::invalid_input(format!(
                "{} is required",
                field_name
            )));
        }
        Ok(())
    }

    /// Parse a calendar date in `YYYY-MM-DD` form
    pub fn validate_issue_date(value: &str) -> EduChainResult<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), ISSUE_DATE_FORMAT).map_err(|e| {
            EduChainError::invalid_input(format!("Invalid issue date '{}': {}", value, e))
        })
    }

    /// Validate string length
    pub fn validate_string_length(s: &str, max_len: usize, field_name: &str) -> EduChainResult<()> {
        if s.len() > max_len {
            return Err(EduChainError::invalid_input(format!(
                "{} too long: {} bytes (max {})",
                field_name,
                s.len(),
                max_len
            )));
        }
        Ok(())
    }

    /// Check the `CERT-<hex>` shape of a caller-supplied id.
    ///
    /// Supplied ids only need the prefix and a non-empty suffix; generated
    /// ids always carry exactly 16 upper-case hex characters.
    pub fn validate_certificate_id(id: &str) -> EduChainResult<()> {
        Self::require_non_empty(id, "certificateId")?;
        Self::validate_string_length(id, 128, "certificateId")?;

        match id.strip_prefix(ID_PREFIX) {
            Some(suffix) if !suffix.trim().is_empty() => Ok(()),
            _ => Err(EduChainError::invalid_input(format!(
                "certificateId must look like {}<{} hex chars>",
                ID_PREFIX,
                ID_RANDOM_BYTES * 2
            ))),
        }
    }

    /// Validate range for numeric values
    pub fn validate_range<T: PartialOrd + Copy + std::fmt::Debug>(
        value: T,
        min: T,
        max: T,
        field_name: &str,
    ) -> EduChainResult<T> {
        if value < min || value > max {
            return Err(EduChainError::invalid_input(format!(
                "{} out of range (min: {:?}, max: {:?})",
                field_name, min, max
            )));
        }
        Ok(value)
    }
}

/// Validation patterns for common use cases
pub mod patterns {
    use super::*;

    /// Certificate issuance pattern: the five business fields plus the date.
    ///
    /// Fields are checked in declaration order so the first missing one is
    /// the one reported.
    pub fn validate_certificate_fields(
        student_name: &str,
        institution_name: &str,
        course_name: &str,
        grade: &str,
        issue_date: &str,
    ) -> EduChainResult<NaiveDate> {
        ValidationUtils::require_non_empty(student_name, "studentName")?;
        ValidationUtils::require_non_empty(institution_name, "institutionName")?;
        ValidationUtils::require_non_empty(course_name, "courseName")?;
        ValidationUtils::require_non_empty(grade, "grade")?;
        ValidationUtils::require_non_empty(issue_date, "issueDate")?;
        ValidationUtils::validate_issue_date(issue_date)
    }
}
