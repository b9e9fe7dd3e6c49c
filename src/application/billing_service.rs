use serde_json::json;
use uuid::Uuid;

use crate::audit::{self, AuditEvent};
use crate::domain::billing::{Billing, ChargeItem};
use crate::domain::errors::DomainError;
use crate::domain::ports::BillingRepository;

pub struct BillingService<R> {
    repo: R,
}

impl<R: BillingRepository> BillingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_billing(
        &self,
        name: &str,
        description: &str,
        items: Vec<ChargeItem>,
        pix_key: Option<String>,
    ) -> Result<Billing, DomainError> {
        let mut billing = Billing::new(name, description, items);
        billing.pix_key = pix_key.filter(|k| !k.trim().is_empty());

        let billing = self.repo.create(billing)?;
        log::info!("Billing created: id={:?}, name={}", billing.id, billing.name);
        audit::record(
            AuditEvent::BillingCreate,
            billing.uuid(),
            json!({ "name": billing.name, "items": billing.items.len() }),
        );
        Ok(billing)
    }

    pub fn list_billings(&self) -> Result<Vec<Billing>, DomainError> {
        self.repo.list_all()
    }

    pub fn get_billing(&self, id: i64) -> Result<Option<Billing>, DomainError> {
        self.repo.get_by_id(id)
    }

    pub fn get_billing_by_uuid(&self, uuid: Uuid) -> Result<Option<Billing>, DomainError> {
        self.repo.get_by_uuid(uuid)
    }

    /// Persist edits; charge items are replaced wholesale.
    pub fn update_billing(&self, billing: Billing) -> Result<Billing, DomainError> {
        if billing.id.is_none() {
            return Err(DomainError::contract("cannot update an unsaved billing"));
        }
        let billing = self.repo.update(billing)?;
        log::info!("Billing updated: id={:?}, name={}", billing.id, billing.name);
        audit::record(
            AuditEvent::BillingUpdate,
            billing.uuid(),
            json!({ "name": billing.name, "items": billing.items.len() }),
        );
        Ok(billing)
    }

    pub fn delete_billing(&self, billing: &Billing) -> Result<(), DomainError> {
        let id = billing
            .id
            .ok_or_else(|| DomainError::contract("cannot delete an unsaved billing"))?;
        self.repo.delete(id)?;
        log::info!("Billing {} soft-deleted", id);
        audit::record(AuditEvent::BillingDelete, billing.uuid(), json!({}));
        Ok(())
    }
}
