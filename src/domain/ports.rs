use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use uuid::Uuid;

use super::bill::{Bill, LineItem};
use super::billing::Billing;
use super::errors::DomainError;
use super::money::Money;

pub trait BillingRepository: Send + Sync + 'static {
    /// Persist a new billing and return it with ids assigned.
    fn create(&self, billing: Billing) -> Result<Billing, DomainError>;
    /// Update fields in place and replace the charge items wholesale.
    fn update(&self, billing: Billing) -> Result<Billing, DomainError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Billing>, DomainError>;
    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Billing>, DomainError>;
    fn list_all(&self) -> Result<Vec<Billing>, DomainError>;
    /// Soft delete.
    fn delete(&self, id: i64) -> Result<(), DomainError>;
}

pub trait BillRepository: Send + Sync + 'static {
    fn create(&self, bill: Bill) -> Result<Bill, DomainError>;
    /// Update fields in place and replace the line items wholesale.
    fn update(&self, bill: Bill) -> Result<Bill, DomainError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Bill>, DomainError>;
    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Bill>, DomainError>;
    fn list_by_billing(&self, billing_id: i64) -> Result<Vec<Bill>, DomainError>;
    /// Soft delete.
    fn delete(&self, id: i64) -> Result<(), DomainError>;
    fn update_pdf_path(&self, id: i64, path: &str) -> Result<(), DomainError>;
    fn update_paid_at(
        &self,
        id: i64,
        paid_at: Option<DateTime<FixedOffset>>,
    ) -> Result<(), DomainError>;
}

pub trait StorageBackend: Send + Sync + 'static {
    /// Store `data` under `key` and return an opaque location.
    fn save(&self, key: &str, data: &[u8]) -> Result<String, DomainError>;
    /// Turn a location returned by `save` into something dereferenceable.
    fn get_url(&self, location: &str) -> Result<String, DomainError>;
}

/// Payment block printed on the invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSection {
    pub qr_png: Vec<u8>,
    pub pix_key: String,
    pub payload: String,
}

/// Everything an invoice renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceDocument<'a> {
    pub billing_name: &'a str,
    pub reference_month: &'a str,
    pub line_items: &'a [LineItem],
    pub total: Money,
    pub notes: &'a str,
    pub due_date: Option<NaiveDate>,
    pub payment: Option<&'a PaymentSection>,
}

pub trait InvoiceRenderer: Send + Sync + 'static {
    /// Produce the finished PDF.
    fn render(&self, document: &InvoiceDocument<'_>) -> Result<Vec<u8>, DomainError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn save(&self, key: &str, data: &[u8]) -> Result<String, DomainError> {
        (**self).save(key, data)
    }

    fn get_url(&self, location: &str) -> Result<String, DomainError> {
        (**self).get_url(location)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn save(&self, key: &str, data: &[u8]) -> Result<String, DomainError> {
        (**self).save(key, data)
    }

    fn get_url(&self, location: &str) -> Result<String, DomainError> {
        (**self).get_url(location)
    }
}

impl<T: InvoiceRenderer + ?Sized> InvoiceRenderer for Arc<T> {
    fn render(&self, document: &InvoiceDocument<'_>) -> Result<Vec<u8>, DomainError> {
        (**self).render(document)
    }
}

impl<T: BillRepository + ?Sized> BillRepository for Arc<T> {
    fn create(&self, bill: Bill) -> Result<Bill, DomainError> {
        (**self).create(bill)
    }

    fn update(&self, bill: Bill) -> Result<Bill, DomainError> {
        (**self).update(bill)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Bill>, DomainError> {
        (**self).get_by_id(id)
    }

    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Bill>, DomainError> {
        (**self).get_by_uuid(uuid)
    }

    fn list_by_billing(&self, billing_id: i64) -> Result<Vec<Bill>, DomainError> {
        (**self).list_by_billing(billing_id)
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        (**self).delete(id)
    }

    fn update_pdf_path(&self, id: i64, path: &str) -> Result<(), DomainError> {
        (**self).update_pdf_path(id, path)
    }

    fn update_paid_at(
        &self,
        id: i64,
        paid_at: Option<DateTime<FixedOffset>>,
    ) -> Result<(), DomainError> {
        (**self).update_paid_at(id, paid_at)
    }
}

impl<T: BillingRepository + ?Sized> BillingRepository for Arc<T> {
    fn create(&self, billing: Billing) -> Result<Billing, DomainError> {
        (**self).create(billing)
    }

    fn update(&self, billing: Billing) -> Result<Billing, DomainError> {
        (**self).update(billing)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Billing>, DomainError> {
        (**self).get_by_id(id)
    }

    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Billing>, DomainError> {
        (**self).get_by_uuid(uuid)
    }

    fn list_all(&self) -> Result<Vec<Billing>, DomainError> {
        (**self).list_all()
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        (**self).delete(id)
    }
}
