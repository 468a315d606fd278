//! Compliance export of the staff audit trail.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::models::{AuditAction, AuditLog};

/// Audit export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExportMetadata {
    /// Export format version
    pub format_version: String,
    /// Export timestamp
    pub exported_at: String,
    /// Entry count
    pub entry_count: usize,
    /// How `security_hash` was derived (display token only)
    pub hash_scheme: String,
}

/// Snapshot of the audit trail, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    pub metadata: AuditExportMetadata,
    pub entries: Vec<AuditLog>,
}

impl AuditExport {
    pub fn new(entries: &[AuditLog]) -> Self {
        Self {
            metadata: AuditExportMetadata {
                format_version: "1.0".to_string(),
                exported_at: chrono::Utc::now().to_rfc3339(),
                entry_count: entries.len(),
                hash_scheme: "SHA256 prefix (9 hex digits)".to_string(),
            },
            entries: entries.to_vec(),
        }
    }

    /// Only the entries of one action kind.
    pub fn filtered(entries: &[AuditLog], action: AuditAction) -> Self {
        let selected: Vec<AuditLog> = entries
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect();
        Self::new(&selected)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("id,timestamp,action,staff_id,entity_id,details,security_hash\n");

        for entry in &self.entries {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                escape_csv(&entry.id),
                escape_csv(&entry.timestamp),
                entry.action.as_str(),
                escape_csv(&entry.staff_id),
                escape_csv(&entry.entity_id),
                escape_csv(&entry.details),
                escape_csv(&entry.security_hash),
            ));
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;

    fn make_trail() -> AuditTrail {
        let mut trail = AuditTrail::new();
        trail.record(AuditAction::Login, "STF- Sarah V.", "SESSION", "Staff console login");
        trail.record(AuditAction::Dispense, "STF- Sarah V.", "TRX-1", "Units dispensed.");
        trail.record(
            AuditAction::VerifyPrescription,
            "STF- Sarah V.",
            "TRX-2",
            "Status updated to confirmed",
        );
        trail
    }

    #[test]
    fn test_audit_export_json() {
        let trail = make_trail();
        let export = AuditExport::new(trail.entries());

        assert_eq!(export.metadata.entry_count, 3);
        let json = export.to_json().unwrap();
        assert!(json.contains("VERIFY_PRESCRIPTION"));
        assert!(json.contains("securityHash"));
    }

    #[test]
    fn test_audit_export_csv() {
        let trail = make_trail();
        let csv = AuditExport::new(trail.entries()).to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4); // Header + 3 entries
        assert!(lines[0].starts_with("id,timestamp,action"));
        assert!(lines[1].contains("VERIFY_PRESCRIPTION"));
        assert!(lines[3].contains("LOGIN"));
    }

    #[test]
    fn test_filtered_export() {
        let trail = make_trail();
        let export = AuditExport::filtered(trail.entries(), AuditAction::Dispense);
        assert_eq!(export.entries.len(), 1);
        assert_eq!(export.entries[0].entity_id, "TRX-1");
    }
}
