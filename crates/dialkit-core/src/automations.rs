//! Automation entities as returned by the backend.
//!
//! ## Observed shape from the automations endpoint
//!
//! Identity is inconsistent upstream: newer records carry `id`, older ones
//! only `automationId` (both may appear, in which case they agree). Callers
//! must go through [`Automation::canonical_id`] rather than reading either
//! field directly.
//!
//! Counters and schedule timestamps are omitted (not `null`-ed) for
//! automations that have never run, so every one of them is an `Option`
//! with a `#[serde(default)]`.
//!
//! The payload also includes fields that change on every poll but are
//! immaterial to consumers (server-internal bookkeeping timestamps, ETag-ish
//! revision counters). Those land in `extra` and are deliberately excluded
//! from change detection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One calling automation, reduced to the fields the client renders and
/// diffs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Legacy identifier; superseded by `id` where both are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_contacts: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_calls: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,

    /// Upstream fields irrelevant to rendering and change detection.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Automation {
    /// The stable identifier for this automation: `id` when present,
    /// otherwise the legacy `automationId`.
    #[must_use]
    pub fn canonical_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.automation_id.as_deref())
    }
}

#[cfg(test)]
#[path = "automations_test.rs"]
mod automations_test;
