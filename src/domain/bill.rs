use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::ChargeKind;
use super::money::Money;

/// America/Sao_Paulo. Brazil has not observed daylight saving since 2019.
pub const REFERENCE_TZ: FixedOffset = match FixedOffset::west_opt(3 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid reference offset"),
};

pub fn now_in_reference_tz() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&REFERENCE_TZ)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: Money,
    pub kind: ChargeKind,
    pub sort_order: i32,
}

impl LineItem {
    pub fn new(description: impl Into<String>, amount: Money, kind: ChargeKind) -> Self {
        Self {
            description: description.into(),
            amount,
            kind,
            sort_order: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    NotGenerated,
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// A dated snapshot of a billing.
///
/// Line items and total are only reachable through methods so the total
/// always equals the sum of the line amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BillData")]
pub struct Bill {
    pub id: Option<i64>,
    uuid: Uuid,
    pub billing_id: i64,
    pub reference_month: String,
    line_items: Vec<LineItem>,
    total: Money,
    pub notes: String,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<FixedOffset>>,
    pub pdf_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Serialized form of a [`Bill`]. A `total` in the input is ignored and
/// recomputed from the line items.
#[derive(Deserialize)]
struct BillData {
    id: Option<i64>,
    uuid: Uuid,
    billing_id: i64,
    reference_month: String,
    line_items: Vec<LineItem>,
    notes: String,
    due_date: Option<NaiveDate>,
    paid_at: Option<DateTime<FixedOffset>>,
    pdf_path: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<BillData> for Bill {
    fn from(data: BillData) -> Self {
        let mut bill = Bill::with_uuid(
            data.uuid,
            data.billing_id,
            data.reference_month,
            data.line_items,
            data.notes,
            data.due_date,
        );
        bill.id = data.id;
        bill.paid_at = data.paid_at;
        bill.pdf_path = data.pdf_path;
        bill.created_at = data.created_at;
        bill
    }
}

impl Bill {
    pub fn new(
        billing_id: i64,
        reference_month: impl Into<String>,
        line_items: Vec<LineItem>,
        notes: impl Into<String>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self::with_uuid(
            Uuid::new_v4(),
            billing_id,
            reference_month,
            line_items,
            notes,
            due_date,
        )
    }

    pub fn with_uuid(
        uuid: Uuid,
        billing_id: i64,
        reference_month: impl Into<String>,
        line_items: Vec<LineItem>,
        notes: impl Into<String>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        let mut bill = Self {
            id: None,
            uuid,
            billing_id,
            reference_month: reference_month.into(),
            line_items: Vec::new(),
            total: Money::ZERO,
            notes: notes.into(),
            due_date,
            paid_at: None,
            pdf_path: None,
            created_at: None,
        };
        bill.replace_line_items(line_items);
        bill
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Replace every line item. Sort order is renumbered to follow the given
    /// sequence and the total is recomputed.
    pub fn replace_line_items(&mut self, mut line_items: Vec<LineItem>) {
        for (position, item) in line_items.iter_mut().enumerate() {
            item.sort_order = position as i32;
        }
        self.total = line_items.iter().map(|l| l.amount).sum();
        self.line_items = line_items;
    }

    pub fn invoice_status(&self) -> InvoiceStatus {
        match self.pdf_path {
            Some(_) => InvoiceStatus::Generated,
            None => InvoiceStatus::NotGenerated,
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        match self.paid_at {
            Some(_) => PaymentStatus::Paid,
            None => PaymentStatus::Unpaid,
        }
    }
}

/// Parse a due date typed as `dd/mm/yyyy` or `yyyy-mm-dd`. Blank or invalid
/// text yields `None`.
pub fn parse_due_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
