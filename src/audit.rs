//! Audit trail for state transitions, emitted on the `audit` log target.
//! Where the records end up is decided by the logger configuration.

use serde_json::Value;
use uuid::Uuid;

pub const AUDIT_TARGET: &str = "audit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    BillingCreate,
    BillingUpdate,
    BillingDelete,
    BillCreate,
    BillUpdate,
    BillDelete,
    BillTogglePaid,
    BillRegeneratePdf,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::BillingCreate => "billing.create",
            AuditEvent::BillingUpdate => "billing.update",
            AuditEvent::BillingDelete => "billing.delete",
            AuditEvent::BillCreate => "bill.create",
            AuditEvent::BillUpdate => "bill.update",
            AuditEvent::BillDelete => "bill.delete",
            AuditEvent::BillTogglePaid => "bill.toggle_paid",
            AuditEvent::BillRegeneratePdf => "bill.regenerate_pdf",
        }
    }
}

pub fn record(event: AuditEvent, entity_uuid: Uuid, details: Value) {
    log::info!(
        target: AUDIT_TARGET,
        "{} entity={} details={}",
        event.as_str(),
        entity_uuid,
        details
    );
}
