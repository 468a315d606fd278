//! Append-only staff audit trail.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::ids::short_token;
use crate::models::{AuditAction, AuditLog};

/// Audit entries held newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditTrail {
    entries: Vec<AuditLog>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously persisted trail (already newest first).
    pub fn from_entries(entries: Vec<AuditLog>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AuditLog] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new entry at the front and return it.
    pub fn record(
        &mut self,
        action: AuditAction,
        staff_id: &str,
        entity_id: &str,
        details: &str,
    ) -> &AuditLog {
        let id = short_token();
        let timestamp = chrono::Utc::now().to_rfc3339();
        let security_hash =
            security_hash(&id, &timestamp, action, staff_id, entity_id, details);

        info!(
            action = action.as_str(),
            staff_id,
            entity_id,
            "Audit entry recorded"
        );

        self.entries.insert(
            0,
            AuditLog {
                id,
                timestamp,
                action,
                staff_id: staff_id.to_string(),
                entity_id: entity_id.to_string(),
                details: details.to_string(),
                security_hash,
            },
        );
        &self.entries[0]
    }

    /// Drop the newest entry, undoing a `record` whose write failed.
    pub(crate) fn discard_newest(&mut self) -> Option<AuditLog> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Entries touching one order or product, newest first.
    pub fn for_entity<'a>(&'a self, entity_id: &'a str) -> impl Iterator<Item = &'a AuditLog> + 'a {
        self.entries.iter().filter(move |e| e.entity_id == entity_id)
    }

    /// Entries of one action kind, newest first.
    pub fn by_action(&self, action: AuditAction) -> impl Iterator<Item = &AuditLog> {
        self.entries.iter().filter(move |e| e.action == action)
    }
}

/// Display token: `SHA256-` plus the first nine hex digits of the entry digest.
///
/// Shown on the compliance screen only; nothing verifies it.
pub fn security_hash(
    id: &str,
    timestamp: &str,
    action: AuditAction,
    staff_id: &str,
    entity_id: &str,
    details: &str,
) -> String {
    let mut hasher = Sha256::new();
    for part in [id, timestamp, action.as_str(), staff_id, entity_id, details] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("SHA256-{}", digest[..9].to_uppercase())
}
