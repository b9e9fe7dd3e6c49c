use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::billing::{Billing, ChargeItem};
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::ports::BillingRepository;
use crate::schema::{billing_items, billings};

use super::models::{BillingItemRow, BillingRow, NewBillingItemRow, NewBillingRow};
use super::parse_kind;

pub struct DieselBillingRepository {
    pool: DbPool,
}

impl DieselBillingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: BillingRow, items: Vec<BillingItemRow>) -> Result<Billing, DomainError> {
    let items = items
        .into_iter()
        .map(|i| {
            Ok(ChargeItem {
                id: Some(i.id),
                description: i.description,
                kind: parse_kind(&i.item_type)?,
                amount: Money::from_centavos(i.amount),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    let mut billing = Billing::with_uuid(row.uuid, row.name, row.description, items);
    billing.id = Some(row.id);
    billing.pix_key = row.pix_key;
    billing.pix_merchant_name = row.pix_merchant_name;
    billing.pix_merchant_city = row.pix_merchant_city;
    billing.created_at = Some(row.created_at);
    Ok(billing)
}

fn insert_items(
    conn: &mut PgConnection,
    billing_id: i64,
    items: &[ChargeItem],
) -> Result<(), DomainError> {
    if items.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewBillingItemRow> = items
        .iter()
        .enumerate()
        .map(|(position, item)| NewBillingItemRow {
            billing_id,
            description: &item.description,
            amount: item.amount.centavos(),
            item_type: item.kind.as_str(),
            sort_order: position as i32,
        })
        .collect();
    diesel::insert_into(billing_items::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn load_one(
    conn: &mut PgConnection,
    row: Option<BillingRow>,
) -> Result<Option<Billing>, DomainError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let items = BillingItemRow::belonging_to(&row)
        .select(BillingItemRow::as_select())
        .order(billing_items::sort_order.asc())
        .load(conn)?;
    to_domain(row, items).map(Some)
}

impl BillingRepository for DieselBillingRepository {
    fn create(&self, billing: Billing) -> Result<Billing, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::insert_into(billings::table)
                .values(&NewBillingRow {
                    uuid: billing.uuid(),
                    name: &billing.name,
                    description: &billing.description,
                    pix_key: billing.pix_key.as_deref(),
                    pix_merchant_name: billing.pix_merchant_name.as_deref(),
                    pix_merchant_city: billing.pix_merchant_city.as_deref(),
                })
                .returning(BillingRow::as_returning())
                .get_result(conn)?;

            insert_items(conn, row.id, &billing.items)?;
            load_one(conn, Some(row))?.ok_or(DomainError::NotFound)
        })
    }

    fn update(&self, billing: Billing) -> Result<Billing, DomainError> {
        let id = billing
            .id
            .ok_or_else(|| DomainError::contract("cannot update a billing without an id"))?;
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(
                billings::table
                    .filter(billings::id.eq(id))
                    .filter(billings::deleted_at.is_null()),
            )
            .set((
                billings::name.eq(billing.name.as_str()),
                billings::description.eq(billing.description.as_str()),
                billings::pix_key.eq(billing.pix_key.as_deref()),
                billings::pix_merchant_name.eq(billing.pix_merchant_name.as_deref()),
                billings::pix_merchant_city.eq(billing.pix_merchant_city.as_deref()),
                billings::updated_at.eq(Utc::now()),
            ))
            .returning(BillingRow::as_returning())
            .get_result(conn)
            .optional()?;

            let Some(row) = updated else {
                return Err(DomainError::NotFound);
            };

            diesel::delete(billing_items::table.filter(billing_items::billing_id.eq(id)))
                .execute(conn)?;
            insert_items(conn, id, &billing.items)?;
            load_one(conn, Some(row))?.ok_or(DomainError::NotFound)
        })
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Billing>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = billings::table
            .filter(billings::id.eq(id))
            .filter(billings::deleted_at.is_null())
            .select(BillingRow::as_select())
            .first(&mut conn)
            .optional()?;
        load_one(&mut conn, row)
    }

    fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Billing>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = billings::table
            .filter(billings::uuid.eq(uuid))
            .filter(billings::deleted_at.is_null())
            .select(BillingRow::as_select())
            .first(&mut conn)
            .optional()?;
        load_one(&mut conn, row)
    }

    fn list_all(&self) -> Result<Vec<Billing>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = billings::table
            .filter(billings::deleted_at.is_null())
            .select(BillingRow::as_select())
            .order(billings::name.asc())
            .load(&mut conn)?;

        let items = BillingItemRow::belonging_to(&rows)
            .select(BillingItemRow::as_select())
            .order(billing_items::sort_order.asc())
            .load::<BillingItemRow>(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(row, items)| to_domain(row, items))
            .collect()
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::update(
            billings::table
                .filter(billings::id.eq(id))
                .filter(billings::deleted_at.is_null()),
        )
        .set(billings::deleted_at.eq(Some(Utc::now())))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
