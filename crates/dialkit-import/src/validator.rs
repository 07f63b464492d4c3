//! Batch validation of raw contact records.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;

use dialkit_core::{Contact, ImportError, ImportErrorCode, RawContact, ValidationSummary};

use crate::dates::parse_reference_date;
use crate::phone::normalize_phone;

/// Recognized validation options.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// When true, each record must carry a parseable value in
    /// `reference_date_field`.
    pub require_reference_date: bool,
    /// Wire name of the field validated as a date.
    pub reference_date_field: String,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            require_reference_date: false,
            reference_date_field: "referenceDate".to_string(),
        }
    }
}

/// Result of one validation pass over a batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Normalized contacts, in input order. The caller's records are never
    /// mutated; normalization (phone reduction, email trimming) applies to
    /// these copies only.
    pub valid: Vec<Contact>,
    /// Every failure from every record, flat, in input order. A record with
    /// several failures appears once per failure.
    pub errors: Vec<ImportError>,
    pub summary: ValidationSummary,
}

/// Validates a batch of raw contact records.
///
/// Checks run per record, independently, in input order: required name,
/// phone format (with normalization), duplicate-within-batch on the
/// normalized phone, email trimming, and — when
/// [`ValidateOptions::require_reference_date`] is set — a parseable
/// reference date. Per-record failures are reported in the returned error
/// list, never as an `Err`; the function is synchronous and performs no I/O.
///
/// Duplicate detection is scoped to this call: a phone that fails format
/// validation never enters the seen-set, so only well-formed repeats are
/// flagged.
#[must_use]
pub fn validate_batch(records: &[RawContact], options: &ValidateOptions) -> BatchOutcome {
    let mut valid = Vec::new();
    let mut errors: Vec<ImportError> = Vec::new();
    let mut seen_phones: HashSet<String> = HashSet::new();
    let mut invalid_records = 0usize;

    for (index, raw) in records.iter().enumerate() {
        let errors_before = errors.len();

        let name = match raw.name.as_ref().and_then(Value::as_str).map(str::trim) {
            Some(n) if !n.is_empty() => Some(n.to_string()),
            _ => {
                errors.push(record_error(
                    index,
                    raw,
                    ImportErrorCode::MissingRequiredField,
                    Some("name"),
                    "missing required field: name",
                ));
                None
            }
        };

        let phone_number = match raw.phone_number.as_ref().and_then(Value::as_str) {
            None => {
                errors.push(record_error(
                    index,
                    raw,
                    ImportErrorCode::MissingRequiredField,
                    Some("phone"),
                    "missing required field: phone",
                ));
                None
            }
            Some(p) => match normalize_phone(p) {
                Some(digits) => {
                    if seen_phones.insert(digits.clone()) {
                        Some(digits)
                    } else {
                        errors.push(record_error(
                            index,
                            raw,
                            ImportErrorCode::DuplicateInBatch,
                            Some("phone"),
                            format!("phone number {digits} appears earlier in this batch"),
                        ));
                        None
                    }
                }
                None => {
                    errors.push(record_error(
                        index,
                        raw,
                        ImportErrorCode::InvalidPhoneFormat,
                        Some("phone"),
                        format!("phone number {p:?} must reduce to 7-15 digits"),
                    ));
                    None
                }
            },
        };

        // Email is optional and never format-checked; non-string values are
        // ignored, string values are trimmed into the output copy.
        let email = raw
            .email
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from);

        if options.require_reference_date {
            check_reference_date(index, raw, &options.reference_date_field, &mut errors);
        }

        let failed = errors.len() - errors_before;
        if failed == 0 {
            if let (Some(name), Some(phone_number)) = (name, phone_number) {
                valid.push(Contact {
                    name,
                    phone_number,
                    email,
                    extra: raw.extra.clone(),
                });
            }
        } else {
            invalid_records += 1;
            tracing::debug!(index, failures = failed, "import record failed validation");
        }
    }

    let summary = ValidationSummary {
        total: records.len(),
        valid: valid.len(),
        invalid: invalid_records,
        will_import: valid.len(),
        will_skip: errors.len(),
    };

    BatchOutcome {
        valid,
        errors,
        summary,
    }
}

fn check_reference_date(
    index: usize,
    raw: &RawContact,
    field: &str,
    errors: &mut Vec<ImportError>,
) {
    let value = raw.field(field);

    let blank = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if blank {
        errors.push(record_error(
            index,
            raw,
            ImportErrorCode::MissingRequiredField,
            Some(field),
            format!("missing required field: {field}"),
        ));
        return;
    }

    // `blank` handled the None arm above.
    if let Some(value) = value {
        if parse_reference_date(value).is_none() {
            errors.push(record_error(
                index,
                raw,
                ImportErrorCode::InvalidDateFormat,
                Some(field),
                format!("{field} is not a parseable date"),
            ));
        }
    }
}

fn record_error(
    index: usize,
    raw: &RawContact,
    code: ImportErrorCode,
    field: Option<&str>,
    message: impl Into<String>,
) -> ImportError {
    ImportError {
        index,
        raw: raw.clone(),
        code,
        message: message.into(),
        field: field.map(str::to_owned),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod validator_test;
