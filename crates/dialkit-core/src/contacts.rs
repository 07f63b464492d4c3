//! Contact record types for the import pipeline.
//!
//! ## Observed shapes from import sources
//!
//! Records arrive from spreadsheets and third-party exports, so field values
//! are not trustworthy: a "name" column may contain a number, `phoneNumber`
//! may be missing entirely, and arbitrary extra columns (lead source, notes,
//! custom reference dates) ride along. [`RawContact`] models the named fields
//! as optional JSON values so a non-string payload is representable — and
//! rejectable by the validator — instead of failing at deserialization.
//! Unrecognized fields are preserved in `extra` and carried through to the
//! validated record untouched.
//!
//! [`Contact`] is the validated counterpart. It is only ever produced by the
//! batch validator, never deserialized from wire data directly, so its fields
//! can be trusted: a non-blank name and a digits-only normalized phone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contact record as supplied by an external import source.
///
/// No identity or field validity is assumed until the record has passed
/// batch validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,

    /// Fields the importer does not recognize, keyed by wire name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawContact {
    /// Looks up a field by its wire name, across both the named fields and
    /// the escape-hatch map.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "name" => self.name.as_ref(),
            "phoneNumber" => self.phone_number.as_ref(),
            "email" => self.email.as_ref(),
            other => self.extra.get(other),
        }
    }

    /// Like [`RawContact::field`], but only returns JSON string values.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

/// A contact that has passed batch validation.
///
/// `phone_number` is the normalized, digits-only form — the deduplication
/// and dialing key. `email`, when present, is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub phone_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Unrecognized fields carried over from the raw record.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
#[path = "contacts_test.rs"]
mod contacts_test;
