#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use rentivo::config::PixSettings;
use rentivo::domain::bill::{Bill, LineItem};
use rentivo::domain::billing::{Billing, ChargeItem};
use rentivo::domain::errors::DomainError;
use rentivo::domain::ports::{
    BillRepository, BillingRepository, InvoiceDocument, InvoiceRenderer, StorageBackend,
};
use rentivo::{BillService, BillingService, Money};

// ── Repositories ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryBillings {
    rows: Mutex<Vec<(Billing, bool)>>,
    next_item_id: Mutex<i64>,
}

impl InMemoryBillings {
    fn assign_item_ids(&self, billing: &mut Billing) {
        let mut next = self.next_item_id.lock().unwrap();
        for item in &mut billing.items {
            *next += 1;
            item.id = Some(*next);
        }
    }
}

impl BillingRepository for InMemoryBillings {
    fn create(&self, mut billing: Billing) -> Result<Billing, DomainError> {
        self.assign_item_ids(&mut billing);
        let mut rows = self.rows.lock().unwrap();
        billing.id = Some(rows.len() as i64 + 1);
        rows.push((billing.clone(), false));
        Ok(billing)
    }

    fn update(&self, mut billing: Billing) -> Result<Billing, DomainError> {
        self.assign_item_ids(&mut billing);
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|(b, deleted)| b.id == billing.id && !deleted)
            .ok_or(DomainError::NotFound)?;
        slot.0 = billing.clone();
        Ok(billing)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Billing>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(b, deleted)| b.id == Some(id) && !deleted)
            .map(|(b, _)| b.clone()))
    }

    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Billing>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(b, deleted)| b.uuid() == uuid && !deleted)
            .map(|(b, _)| b.clone()))
    }

    fn list_all(&self) -> Result<Vec<Billing>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(_, deleted)| !deleted)
            .map(|(b, _)| b.clone())
            .collect())
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|(b, deleted)| b.id == Some(id) && !deleted)
            .ok_or(DomainError::NotFound)?;
        slot.1 = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBills {
    rows: Mutex<Vec<(Bill, bool)>>,
}

impl InMemoryBills {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Raw row, including soft-deleted ones.
    pub fn raw(&self, id: i64) -> Option<(Bill, bool)> {
        let rows = self.rows.lock().unwrap();
        rows.iter().find(|(b, _)| b.id == Some(id)).cloned()
    }

    fn with_live<T>(
        &self,
        id: i64,
        f: impl FnOnce(&mut Bill) -> T,
    ) -> Result<T, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|(b, deleted)| b.id == Some(id) && !deleted)
            .ok_or(DomainError::NotFound)?;
        Ok(f(&mut slot.0))
    }
}

impl BillRepository for InMemoryBills {
    fn create(&self, mut bill: Bill) -> Result<Bill, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        bill.id = Some(rows.len() as i64 + 1);
        rows.push((bill.clone(), false));
        Ok(bill)
    }

    fn update(&self, bill: Bill) -> Result<Bill, DomainError> {
        let id = bill.id.ok_or(DomainError::NotFound)?;
        let stored = bill.clone();
        self.with_live(id, move |b| *b = stored)?;
        Ok(bill)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Bill>, DomainError> {
        Ok(self.with_live(id, |b| b.clone()).ok())
    }

    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Bill>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(b, deleted)| b.uuid() == uuid && !deleted)
            .map(|(b, _)| b.clone()))
    }

    fn list_by_billing(&self, billing_id: i64) -> Result<Vec<Bill>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(b, deleted)| b.billing_id == billing_id && !deleted)
            .map(|(b, _)| b.clone())
            .collect())
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|(b, deleted)| b.id == Some(id) && !deleted)
            .ok_or(DomainError::NotFound)?;
        slot.1 = true;
        Ok(())
    }

    fn update_pdf_path(&self, id: i64, path: &str) -> Result<(), DomainError> {
        let path = path.to_string();
        self.with_live(id, move |b| b.pdf_path = Some(path))
    }

    fn update_paid_at(
        &self,
        id: i64,
        paid_at: Option<DateTime<FixedOffset>>,
    ) -> Result<(), DomainError> {
        self.with_live(id, move |b| b.paid_at = paid_at)
    }
}

// ── Storage ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail: Mutex<bool>,
}

impl MemoryStorage {
    pub fn fail_writes(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, location: &str) -> bool {
        let key = location.trim_start_matches("mem://");
        self.files.lock().unwrap().contains_key(key)
    }
}

impl StorageBackend for MemoryStorage {
    fn save(&self, key: &str, data: &[u8]) -> Result<String, DomainError> {
        if *self.fail.lock().unwrap() {
            return Err(DomainError::Storage("disk full".to_string()));
        }
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        Ok(format!("mem://{}", key))
    }

    fn get_url(&self, location: &str) -> Result<String, DomainError> {
        Ok(format!(
            "https://files.example/{}",
            location.trim_start_matches("mem://")
        ))
    }
}

// ── Renderer ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Rendered {
    pub billing_name: String,
    pub lines: Vec<(String, Money)>,
    pub total: Money,
    pub notes: String,
    pub payload: Option<String>,
    pub pix_key: Option<String>,
    pub has_qr: bool,
}

#[derive(Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Rendered {
        self.calls().pop().expect("renderer was never called")
    }
}

impl InvoiceRenderer for RecordingRenderer {
    fn render(&self, document: &InvoiceDocument<'_>) -> Result<Vec<u8>, DomainError> {
        self.calls.lock().unwrap().push(Rendered {
            billing_name: document.billing_name.to_string(),
            lines: document
                .line_items
                .iter()
                .map(|l: &LineItem| (l.description.clone(), l.amount))
                .collect(),
            total: document.total,
            notes: document.notes.to_string(),
            payload: document.payment.map(|p| p.payload.clone()),
            pix_key: document.payment.map(|p| p.pix_key.clone()),
            has_qr: document.payment.map_or(false, |p| !p.qr_png.is_empty()),
        });
        Ok(format!("%PDF-fake {}", document.billing_name).into_bytes())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub struct Harness {
    pub bills: Arc<InMemoryBills>,
    pub storage: Arc<MemoryStorage>,
    pub renderer: Arc<RecordingRenderer>,
    pub service: BillService<Arc<InMemoryBills>, Arc<MemoryStorage>, Arc<RecordingRenderer>>,
    pub billings: BillingService<Arc<InMemoryBillings>>,
}

pub fn pix_defaults() -> PixSettings {
    PixSettings {
        key: Some("dono@example.com".to_string()),
        merchant_name: Some("Dona Maria".to_string()),
        merchant_city: Some("Curitiba".to_string()),
    }
}

pub fn harness(pix: PixSettings, prefix: Option<&str>) -> Harness {
    let bills = Arc::new(InMemoryBills::default());
    let storage = Arc::new(MemoryStorage::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let service = BillService::new(bills.clone(), storage.clone(), renderer.clone())
        .with_pix_defaults(pix)
        .with_storage_prefix(prefix.map(str::to_string));
    let billings = BillingService::new(Arc::new(InMemoryBillings::default()));
    Harness {
        bills,
        storage,
        renderer,
        service,
        billings,
    }
}

/// One fixed rent item of 2.850,00 and one variable water item.
pub fn rent_and_water(h: &Harness) -> Billing {
    h.billings
        .create_billing(
            "Apto 101",
            "Rua das Flores, 10",
            vec![
                ChargeItem::fixed("Aluguel", Money::from_centavos(285000)),
                ChargeItem::variable("Água"),
            ],
            None,
        )
        .expect("create billing")
}

pub fn water_id(billing: &Billing) -> i64 {
    billing.items[1].id.expect("persisted item")
}
