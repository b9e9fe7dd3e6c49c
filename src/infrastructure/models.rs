use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{bill_line_items, billing_items, billings, bills};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = billings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BillingRow {
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub pix_key: Option<String>,
    pub pix_merchant_name: Option<String>,
    pub pix_merchant_city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = billings)]
pub struct NewBillingRow<'a> {
    pub uuid: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub pix_key: Option<&'a str>,
    pub pix_merchant_name: Option<&'a str>,
    pub pix_merchant_city: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = billing_items)]
#[diesel(belongs_to(BillingRow, foreign_key = billing_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BillingItemRow {
    pub id: i64,
    pub billing_id: i64,
    pub description: String,
    pub amount: i64,
    pub item_type: String,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = billing_items)]
pub struct NewBillingItemRow<'a> {
    pub billing_id: i64,
    pub description: &'a str,
    pub amount: i64,
    pub item_type: &'static str,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = bills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BillRow {
    pub id: i64,
    pub uuid: Uuid,
    pub billing_id: i64,
    pub reference_month: String,
    pub total_amount: i64,
    pub notes: String,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub pdf_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bills)]
pub struct NewBillRow<'a> {
    pub uuid: Uuid,
    pub billing_id: i64,
    pub reference_month: &'a str,
    pub total_amount: i64,
    pub notes: &'a str,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub pdf_path: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = bill_line_items)]
#[diesel(belongs_to(BillRow, foreign_key = bill_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LineItemRow {
    pub id: i64,
    pub bill_id: i64,
    pub description: String,
    pub amount: i64,
    pub item_type: String,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bill_line_items)]
pub struct NewLineItemRow<'a> {
    pub bill_id: i64,
    pub description: &'a str,
    pub amount: i64,
    pub item_type: &'static str,
    pub sort_order: i32,
}
