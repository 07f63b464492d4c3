//! Wire types for the dialkit backend API.

use serde::{Deserialize, Serialize};

use dialkit_core::{Automation, ImportErrorCode};

/// Envelope for `GET /v1/automations`.
#[derive(Debug, Deserialize)]
pub struct AutomationsResponse {
    pub automations: Vec<Automation>,
}

/// Outcome of `POST /v1/contacts/import`.
///
/// The server re-validates every submitted contact against checks the client
/// cannot run (contact database, DNC lists, blacklists, dialing windows);
/// `rejected` carries those verdicts in the shared error vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReceipt {
    pub accepted: usize,
    #[serde(default)]
    pub rejected: Vec<RejectedContact>,
}

/// One server-side rejection, keyed by the submitted batch position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedContact {
    pub index: usize,
    pub code: ImportErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
