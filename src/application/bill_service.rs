use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use super::payment::{payment_section, resolve_pix_config};
use crate::audit::{self, AuditEvent};
use crate::config::{PixSettings, Settings};
use crate::domain::assembler::{assemble, ExtraCharge};
use crate::domain::bill::{now_in_reference_tz, Bill, LineItem};
use crate::domain::billing::Billing;
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::ports::{BillRepository, InvoiceDocument, InvoiceRenderer, StorageBackend};

/// `[<prefix>/]<billing-uuid>/<bill-uuid>.pdf`
pub fn storage_key(prefix: Option<&str>, billing_uuid: Uuid, bill_uuid: Uuid) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            format!("{}/{}/{}.pdf", prefix, billing_uuid, bill_uuid)
        }
        _ => format!("{}/{}.pdf", billing_uuid, bill_uuid),
    }
}

/// Bill lifecycle: generation, edits, invoice rendering, paid toggling and
/// soft deletion.
///
/// Every operation that changes what an invoice shows re-renders and stores
/// the PDF. If rendering or storage fails, the bill row that was already
/// written stays as it is and keeps its previous `pdf_path`.
pub struct BillService<R, S, P> {
    repo: R,
    storage: S,
    renderer: P,
    pix_defaults: PixSettings,
    storage_prefix: Option<String>,
}

impl<R, S, P> BillService<R, S, P>
where
    R: BillRepository,
    S: StorageBackend,
    P: InvoiceRenderer,
{
    pub fn new(repo: R, storage: S, renderer: P) -> Self {
        Self {
            repo,
            storage,
            renderer,
            pix_defaults: PixSettings::default(),
            storage_prefix: None,
        }
    }

    pub fn from_settings(repo: R, storage: S, renderer: P, settings: &Settings) -> Self {
        Self::new(repo, storage, renderer)
            .with_pix_defaults(settings.pix.clone())
            .with_storage_prefix(settings.storage.prefix.clone())
    }

    pub fn with_pix_defaults(mut self, pix: PixSettings) -> Self {
        self.pix_defaults = pix;
        self
    }

    pub fn with_storage_prefix(mut self, prefix: Option<String>) -> Self {
        self.storage_prefix = prefix;
        self
    }

    pub fn generate_bill(
        &self,
        billing: &Billing,
        reference_month: &str,
        variable_amounts: &HashMap<i64, Money>,
        extras: &[ExtraCharge],
        notes: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Bill, DomainError> {
        let billing_id = billing
            .id
            .ok_or_else(|| DomainError::contract("cannot generate a bill for an unsaved billing"))?;

        let assembled = assemble(billing, variable_amounts, extras)?;
        let bill = Bill::new(
            billing_id,
            reference_month,
            assembled.line_items,
            notes,
            due_date,
        );
        let mut bill = self.repo.create(bill)?;
        log::info!(
            "Bill created: id={:?}, billing={}, month={}, total={}",
            bill.id,
            billing.name,
            reference_month,
            bill.total().centavos()
        );
        audit::record(
            AuditEvent::BillCreate,
            bill.uuid(),
            json!({
                "billing_uuid": billing.uuid(),
                "reference_month": reference_month,
                "total": bill.total(),
            }),
        );

        self.render_and_store(&mut bill, billing)?;
        Ok(bill)
    }

    /// Replace the line items wholesale, persist, and re-render.
    pub fn update_bill(
        &self,
        mut bill: Bill,
        billing: &Billing,
        line_items: Vec<LineItem>,
        notes: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Bill, DomainError> {
        ensure_owned_by(&bill, billing)?;
        if bill.id.is_none() {
            return Err(DomainError::contract("cannot update an unsaved bill"));
        }
        if Money::checked_sum(line_items.iter().map(|l| l.amount)).is_none() {
            return Err(DomainError::contract("bill total is out of range"));
        }

        let previous_total = bill.total();
        bill.replace_line_items(line_items);
        bill.notes = notes.to_string();
        bill.due_date = due_date;

        let mut bill = self.repo.update(bill)?;
        log::info!(
            "Bill updated: id={:?}, total={}",
            bill.id,
            bill.total().centavos()
        );
        audit::record(
            AuditEvent::BillUpdate,
            bill.uuid(),
            json!({ "previous_total": previous_total, "total": bill.total() }),
        );

        self.render_and_store(&mut bill, billing)?;
        Ok(bill)
    }

    /// Re-render with the billing's current payment settings without touching
    /// the bill's content.
    pub fn regenerate_pdf(&self, mut bill: Bill, billing: &Billing) -> Result<Bill, DomainError> {
        ensure_owned_by(&bill, billing)?;
        self.render_and_store(&mut bill, billing)?;
        audit::record(
            AuditEvent::BillRegeneratePdf,
            bill.uuid(),
            json!({ "pdf_path": bill.pdf_path }),
        );
        Ok(bill)
    }

    /// Flip between unpaid and paid-now. Two calls restore the original state.
    pub fn toggle_paid(&self, mut bill: Bill) -> Result<Bill, DomainError> {
        let id = bill
            .id
            .ok_or_else(|| DomainError::contract("cannot toggle paid on an unsaved bill"))?;

        let paid_at = match bill.paid_at {
            Some(_) => None,
            None => Some(now_in_reference_tz()),
        };
        self.repo.update_paid_at(id, paid_at)?;
        bill.paid_at = paid_at;

        let state = if paid_at.is_some() { "paid" } else { "unpaid" };
        log::info!("Bill {} marked as {}", id, state);
        audit::record(
            AuditEvent::BillTogglePaid,
            bill.uuid(),
            json!({ "state": state }),
        );
        Ok(bill)
    }

    /// Soft delete. The stored invoice stays where it is.
    pub fn delete_bill(&self, bill: &Bill) -> Result<(), DomainError> {
        let id = bill
            .id
            .ok_or_else(|| DomainError::contract("cannot delete an unsaved bill"))?;
        self.repo.delete(id)?;
        log::info!("Bill {} soft-deleted", id);
        audit::record(
            AuditEvent::BillDelete,
            bill.uuid(),
            json!({ "pdf_path": bill.pdf_path }),
        );
        Ok(())
    }

    /// Empty when the bill has no stored invoice yet.
    pub fn get_invoice_url(&self, pdf_path: Option<&str>) -> Result<String, DomainError> {
        match pdf_path {
            Some(path) if !path.is_empty() => self.storage.get_url(path),
            _ => Ok(String::new()),
        }
    }

    pub fn list_bills(&self, billing_id: i64) -> Result<Vec<Bill>, DomainError> {
        self.repo.list_by_billing(billing_id)
    }

    pub fn get_bill(&self, id: i64) -> Result<Option<Bill>, DomainError> {
        self.repo.get_by_id(id)
    }

    pub fn get_bill_by_uuid(&self, uuid: Uuid) -> Result<Option<Bill>, DomainError> {
        self.repo.get_by_uuid(uuid)
    }

    fn render_and_store(&self, bill: &mut Bill, billing: &Billing) -> Result<String, DomainError> {
        let id = bill
            .id
            .ok_or_else(|| DomainError::contract("cannot store an invoice for an unsaved bill"))?;

        let pix = resolve_pix_config(billing, &self.pix_defaults);
        let payment = payment_section(&pix, bill.total())?;

        let document = InvoiceDocument {
            billing_name: &billing.name,
            reference_month: &bill.reference_month,
            line_items: bill.line_items(),
            total: bill.total(),
            notes: &bill.notes,
            due_date: bill.due_date,
            payment: payment.as_ref(),
        };
        let pdf = self.renderer.render(&document)?;

        let key = storage_key(self.storage_prefix.as_deref(), billing.uuid(), bill.uuid());
        let location = self.storage.save(&key, &pdf)?;
        log::info!("PDF stored at {} for bill {}", key, bill.uuid());

        self.repo.update_pdf_path(id, &location)?;
        bill.pdf_path = Some(location.clone());
        Ok(location)
    }
}

fn ensure_owned_by(bill: &Bill, billing: &Billing) -> Result<(), DomainError> {
    if billing.id != Some(bill.billing_id) {
        return Err(DomainError::contract(format!(
            "bill {} does not belong to billing {:?}",
            bill.uuid(),
            billing.id
        )));
    }
    Ok(())
}
