//! Content fingerprints for polled automation collections.

use sha2::{Digest, Sha256};

use dialkit_core::Automation;

/// Computes an order-sensitive fingerprint over the change-relevant fields
/// of a collection: canonical id, name, active flag, progress counters, and
/// schedule timestamps. Server-internal fields in `extra` are deliberately
/// excluded, so churn in immaterial bookkeeping does not read as change.
///
/// Absent fields serialize as empty strings, which makes presence itself
/// part of the fingerprint: a counter appearing for the first time is a
/// change even if its value is zero.
#[must_use]
pub fn fingerprint(automations: &[Automation]) -> String {
    fn opt<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(String::new, |v| v.to_string())
    }

    let mut hasher = Sha256::new();
    for automation in automations {
        let entry = format!(
            "{}\x00{}\x00{}\x00{}\x00{}\x00{}\x00{}",
            automation.canonical_id().unwrap_or(""),
            automation.name,
            automation.is_active,
            opt(automation.total_contacts),
            opt(automation.completed_calls),
            opt(automation.last_run_at.map(|t| t.to_rfc3339())),
            opt(automation.next_run_at.map(|t| t.to_rfc3339())),
        );
        hasher.update(entry.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
