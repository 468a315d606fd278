//! Audit log models.

use serde::{Deserialize, Serialize};

/// Kind of staff action recorded in the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Dispense,
    VerifyPrescription,
    Login,
    RecallVoid,
    ConsultationStart,
    MtmUpdate,
    VendorPoCreate,
    InventoryRestock,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Dispense => "DISPENSE",
            AuditAction::VerifyPrescription => "VERIFY_PRESCRIPTION",
            AuditAction::Login => "LOGIN",
            AuditAction::RecallVoid => "RECALL_VOID",
            AuditAction::ConsultationStart => "CONSULTATION_START",
            AuditAction::MtmUpdate => "MTM_UPDATE",
            AuditAction::VendorPoCreate => "VENDOR_PO_CREATE",
            AuditAction::InventoryRestock => "INVENTORY_RESTOCK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DISPENSE" => Some(AuditAction::Dispense),
            "VERIFY_PRESCRIPTION" => Some(AuditAction::VerifyPrescription),
            "LOGIN" => Some(AuditAction::Login),
            "RECALL_VOID" => Some(AuditAction::RecallVoid),
            "CONSULTATION_START" => Some(AuditAction::ConsultationStart),
            "MTM_UPDATE" => Some(AuditAction::MtmUpdate),
            "VENDOR_PO_CREATE" => Some(AuditAction::VendorPoCreate),
            "INVENTORY_RESTOCK" => Some(AuditAction::InventoryRestock),
            _ => None,
        }
    }
}

/// One append-only audit record.
///
/// `security_hash` is a display token for the compliance screen. It is derived
/// from the record contents but nothing verifies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub action: AuditAction,
    /// Acting staff identifier
    pub staff_id: String,
    /// Order or product identifier the action applies to
    pub entity_id: String,
    pub details: String,
    pub security_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuditAction::VerifyPrescription).unwrap(),
            r#""VERIFY_PRESCRIPTION""#
        );
        assert_eq!(
            serde_json::to_string(&AuditAction::VendorPoCreate).unwrap(),
            r#""VENDOR_PO_CREATE""#
        );
        assert_eq!(AuditAction::parse("MTM_UPDATE"), Some(AuditAction::MtmUpdate));
        assert_eq!(AuditAction::parse("DELETE"), None);
    }
}
