use chrono::{DateTime, FixedOffset, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::bill::{Bill, LineItem, REFERENCE_TZ};
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::ports::BillRepository;
use crate::schema::{bill_line_items, bills};

use super::models::{BillRow, LineItemRow, NewBillRow, NewLineItemRow};
use super::parse_kind;

pub struct DieselBillRepository {
    pool: DbPool,
}

impl DieselBillRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: BillRow, items: Vec<LineItemRow>) -> Result<Bill, DomainError> {
    let items = items
        .into_iter()
        .map(|i| {
            Ok(LineItem {
                description: i.description,
                amount: Money::from_centavos(i.amount),
                kind: parse_kind(&i.item_type)?,
                sort_order: i.sort_order,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    let mut bill = Bill::with_uuid(
        row.uuid,
        row.billing_id,
        row.reference_month,
        items,
        row.notes,
        row.due_date,
    );
    bill.id = Some(row.id);
    bill.paid_at = row.paid_at.map(|t| t.with_timezone(&REFERENCE_TZ));
    bill.pdf_path = row.pdf_path;
    bill.created_at = Some(row.created_at);
    Ok(bill)
}

fn insert_line_items(
    conn: &mut PgConnection,
    bill_id: i64,
    items: &[LineItem],
) -> Result<(), DomainError> {
    if items.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewLineItemRow> = items
        .iter()
        .map(|item| NewLineItemRow {
            bill_id,
            description: &item.description,
            amount: item.amount.centavos(),
            item_type: item.kind.as_str(),
            sort_order: item.sort_order,
        })
        .collect();
    diesel::insert_into(bill_line_items::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn load_one(conn: &mut PgConnection, row: Option<BillRow>) -> Result<Option<Bill>, DomainError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let items = LineItemRow::belonging_to(&row)
        .select(LineItemRow::as_select())
        .order(bill_line_items::sort_order.asc())
        .load(conn)?;
    to_domain(row, items).map(Some)
}

fn expect_one(affected: usize) -> Result<(), DomainError> {
    if affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}

impl BillRepository for DieselBillRepository {
    fn create(&self, bill: Bill) -> Result<Bill, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::insert_into(bills::table)
                .values(&NewBillRow {
                    uuid: bill.uuid(),
                    billing_id: bill.billing_id,
                    reference_month: &bill.reference_month,
                    total_amount: bill.total().centavos(),
                    notes: &bill.notes,
                    due_date: bill.due_date,
                    paid_at: bill.paid_at.map(|t| t.with_timezone(&Utc)),
                    pdf_path: bill.pdf_path.as_deref(),
                })
                .returning(BillRow::as_returning())
                .get_result(conn)?;

            insert_line_items(conn, row.id, bill.line_items())?;
            load_one(conn, Some(row))?.ok_or(DomainError::NotFound)
        })
    }

    fn update(&self, bill: Bill) -> Result<Bill, DomainError> {
        let id = bill
            .id
            .ok_or_else(|| DomainError::contract("cannot update a bill without an id"))?;
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(
                bills::table
                    .filter(bills::id.eq(id))
                    .filter(bills::deleted_at.is_null()),
            )
            .set((
                bills::reference_month.eq(bill.reference_month.as_str()),
                bills::total_amount.eq(bill.total().centavos()),
                bills::notes.eq(bill.notes.as_str()),
                bills::due_date.eq(bill.due_date),
                bills::updated_at.eq(Utc::now()),
            ))
            .returning(BillRow::as_returning())
            .get_result(conn)
            .optional()?;

            let Some(row) = updated else {
                return Err(DomainError::NotFound);
            };

            diesel::delete(bill_line_items::table.filter(bill_line_items::bill_id.eq(id)))
                .execute(conn)?;
            insert_line_items(conn, id, bill.line_items())?;
            load_one(conn, Some(row))?.ok_or(DomainError::NotFound)
        })
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Bill>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = bills::table
            .filter(bills::id.eq(id))
            .filter(bills::deleted_at.is_null())
            .select(BillRow::as_select())
            .first(&mut conn)
            .optional()?;
        load_one(&mut conn, row)
    }

    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Bill>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = bills::table
            .filter(bills::uuid.eq(uuid))
            .filter(bills::deleted_at.is_null())
            .select(BillRow::as_select())
            .first(&mut conn)
            .optional()?;
        load_one(&mut conn, row)
    }

    fn list_by_billing(&self, billing_id: i64) -> Result<Vec<Bill>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = bills::table
            .filter(bills::billing_id.eq(billing_id))
            .filter(bills::deleted_at.is_null())
            .select(BillRow::as_select())
            .order((bills::reference_month.desc(), bills::created_at.desc()))
            .load(&mut conn)?;

        let items = LineItemRow::belonging_to(&rows)
            .select(LineItemRow::as_select())
            .order(bill_line_items::sort_order.asc())
            .load::<LineItemRow>(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(row, items)| to_domain(row, items))
            .collect()
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::update(
            bills::table
                .filter(bills::id.eq(id))
                .filter(bills::deleted_at.is_null()),
        )
        .set(bills::deleted_at.eq(Some(Utc::now())))
        .execute(&mut conn)?;
        expect_one(affected)
    }

    fn update_pdf_path(&self, id: i64, path: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::update(bills::table.filter(bills::id.eq(id)))
            .set((
                bills::pdf_path.eq(Some(path)),
                bills::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        expect_one(affected)
    }

    fn update_paid_at(
        &self,
        id: i64,
        paid_at: Option<DateTime<FixedOffset>>,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::update(bills::table.filter(bills::id.eq(id)))
            .set((
                bills::paid_at.eq(paid_at.map(|t| t.with_timezone(&Utc))),
                bills::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        expect_one(affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use diesel::prelude::*;

    use super::DieselBillRepository;
    use crate::domain::bill::{now_in_reference_tz, Bill, LineItem};
    use crate::domain::billing::{Billing, ChargeItem, ChargeKind};
    use crate::domain::errors::DomainError;
    use crate::domain::money::Money;
    use crate::domain::ports::{BillRepository, BillingRepository};
    use crate::infrastructure::test_support::setup_db;
    use crate::infrastructure::DieselBillingRepository;
    use crate::schema::bills;

    fn lines() -> Vec<LineItem> {
        vec![
            LineItem::new("Aluguel", Money::from_centavos(285000), ChargeKind::Fixed),
            LineItem::new("Água", Money::from_centavos(12000), ChargeKind::Variable),
            LineItem::new("Late fee", Money::from_centavos(5000), ChargeKind::Extra),
        ]
    }

    fn seed_billing(pool: &crate::db::DbPool) -> i64 {
        let repo = DieselBillingRepository::new(pool.clone());
        let billing = Billing::new(
            "Apto 101",
            "",
            vec![ChargeItem::fixed("Aluguel", Money::from_centavos(285000))],
        );
        repo.create(billing).expect("billing create failed").id.unwrap()
    }

    #[tokio::test]
    async fn create_persists_lines_and_total() {
        let (_container, pool) = setup_db().await;
        let billing_id = seed_billing(&pool);
        let repo = DieselBillRepository::new(pool);

        let due = NaiveDate::from_ymd_opt(2025, 4, 10);
        let created = repo
            .create(Bill::new(billing_id, "2025-03", lines(), "obs", due))
            .expect("create failed");

        assert!(created.id.is_some());
        assert_eq!(created.total(), Money::from_centavos(302000));
        assert_eq!(created.due_date, due);
        let descriptions: Vec<&str> = created
            .line_items()
            .iter()
            .map(|l| l.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Aluguel", "Água", "Late fee"]);
        assert!(created.pdf_path.is_none());
        assert!(created.paid_at.is_none());
    }

    #[tokio::test]
    async fn update_replaces_lines() {
        let (_container, pool) = setup_db().await;
        let billing_id = seed_billing(&pool);
        let repo = DieselBillRepository::new(pool.clone());

        let mut bill = repo
            .create(Bill::new(billing_id, "2025-03", lines(), "", None))
            .expect("create failed");
        bill.replace_line_items(vec![LineItem::new(
            "Aluguel",
            Money::from_centavos(300000),
            ChargeKind::Fixed,
        )]);
        bill.notes = "reajuste".to_string();
        let updated = repo.update(bill).expect("update failed");

        assert_eq!(updated.line_items().len(), 1);
        assert_eq!(updated.total(), Money::from_centavos(300000));
        assert_eq!(updated.notes, "reajuste");

        let mut conn = pool.get().unwrap();
        let stored_total: i64 = bills::table
            .filter(bills::id.eq(updated.id.unwrap()))
            .select(bills::total_amount)
            .first(&mut conn)
            .unwrap();
        assert_eq!(stored_total, 300000);
    }

    #[tokio::test]
    async fn narrow_updates_touch_single_fields() {
        let (_container, pool) = setup_db().await;
        let billing_id = seed_billing(&pool);
        let repo = DieselBillRepository::new(pool);

        let bill = repo
            .create(Bill::new(billing_id, "2025-03", lines(), "", None))
            .expect("create failed");
        let id = bill.id.unwrap();

        repo.update_pdf_path(id, "/data/a/b.pdf").unwrap();
        repo.update_paid_at(id, Some(now_in_reference_tz())).unwrap();
        let reloaded = repo.get_by_uuid(bill.uuid()).unwrap().unwrap();
        assert_eq!(reloaded.pdf_path.as_deref(), Some("/data/a/b.pdf"));
        assert!(reloaded.paid_at.is_some());
        assert_eq!(reloaded.total(), bill.total());

        repo.update_paid_at(id, None).unwrap();
        assert!(repo.get_by_id(id).unwrap().unwrap().paid_at.is_none());
    }

    #[tokio::test]
    async fn soft_delete_hides_bill_but_keeps_row() {
        let (_container, pool) = setup_db().await;
        let billing_id = seed_billing(&pool);
        let repo = DieselBillRepository::new(pool.clone());

        let bill = repo
            .create(Bill::new(billing_id, "2025-03", lines(), "", None))
            .expect("create failed");
        let id = bill.id.unwrap();
        repo.update_pdf_path(id, "/data/x.pdf").unwrap();
        repo.delete(id).expect("delete failed");

        assert!(repo.get_by_id(id).unwrap().is_none());
        assert!(repo.list_by_billing(billing_id).unwrap().is_empty());
        assert!(matches!(repo.delete(id), Err(DomainError::NotFound)));

        let mut conn = pool.get().unwrap();
        let path: Option<String> = bills::table
            .filter(bills::id.eq(id))
            .select(bills::pdf_path)
            .first(&mut conn)
            .unwrap();
        assert_eq!(path.as_deref(), Some("/data/x.pdf"));
    }

    #[tokio::test]
    async fn list_by_billing_newest_period_first() {
        let (_container, pool) = setup_db().await;
        let billing_id = seed_billing(&pool);
        let repo = DieselBillRepository::new(pool);

        for month in ["2025-01", "2025-03", "2025-02"] {
            repo.create(Bill::new(billing_id, month, lines(), "", None))
                .expect("create failed");
        }

        let bills = repo.list_by_billing(billing_id).expect("list failed");
        let months: Vec<&str> = bills.iter().map(|b| b.reference_month.as_str()).collect();
        assert_eq!(months, vec!["2025-03", "2025-02", "2025-01"]);
        assert!(bills.iter().all(|b| b.line_items().len() == 3));
    }

    #[tokio::test]
    async fn narrow_update_on_unknown_id_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselBillRepository::new(pool);

        assert!(matches!(
            repo.update_pdf_path(9999, "/x.pdf"),
            Err(DomainError::NotFound)
        ));
    }
}
