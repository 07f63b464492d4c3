//! Import error taxonomy shared with the server.
//!
//! The code enumeration is a wire contract: the server's import pipeline
//! emits the same strings, and error-handling UI renders a unified taxonomy
//! regardless of where an error originated. The client-side validator only
//! ever produces `MISSING_REQUIRED_FIELD`, `INVALID_PHONE_FORMAT`,
//! `DUPLICATE_IN_BATCH`, and `INVALID_DATE_FORMAT`; the remaining codes
//! require state only the server holds (the contact database, DNC lists,
//! blacklists, dialing windows, consent records).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contacts::RawContact;

/// Machine-readable import failure codes.
///
/// Serialized form must match the server byte for byte; see
/// [`ImportErrorCode::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorCode {
    MissingRequiredField,
    InvalidPhoneFormat,
    DuplicateInBatch,
    DuplicateInDb,
    DncBlocked,
    RateLimited,
    BlacklistedNumber,
    TimeWindowBlocked,
    IntegrationFailure,
    ValidationRuleFailed,
    InvalidDateFormat,
    NoConsent,
}

impl ImportErrorCode {
    /// The wire string for this code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImportErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ImportErrorCode::InvalidPhoneFormat => "INVALID_PHONE_FORMAT",
            ImportErrorCode::DuplicateInBatch => "DUPLICATE_IN_BATCH",
            ImportErrorCode::DuplicateInDb => "DUPLICATE_IN_DB",
            ImportErrorCode::DncBlocked => "DNC_BLOCKED",
            ImportErrorCode::RateLimited => "RATE_LIMITED",
            ImportErrorCode::BlacklistedNumber => "BLACKLISTED_NUMBER",
            ImportErrorCode::TimeWindowBlocked => "TIME_WINDOW_BLOCKED",
            ImportErrorCode::IntegrationFailure => "INTEGRATION_FAILURE",
            ImportErrorCode::ValidationRuleFailed => "VALIDATION_RULE_FAILED",
            ImportErrorCode::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ImportErrorCode::NoConsent => "NO_CONSENT",
        }
    }
}

impl std::fmt::Display for ImportErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation failure, tied to the offending record by input position.
///
/// A record that fails several checks contributes one `ImportError` per
/// failed check, all carrying the same `index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    /// Position of the offending record in the input batch.
    pub index: usize,

    /// The original record, preserved for diagnostics.
    pub raw: RawContact,

    pub code: ImportErrorCode,
    pub message: String,

    /// Wire name of the offending field. Absent for batch-level failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Creation time of the error. Informational only.
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counts for one validation pass.
///
/// `will_skip` counts errors, not distinct invalid records, so
/// `will_import + will_skip` can exceed `total` when a record carries more
/// than one error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub will_import: usize,
    pub will_skip: usize,
}

#[cfg(test)]
#[path = "import_test.rs"]
mod import_test;
