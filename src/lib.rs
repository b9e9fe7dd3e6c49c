pub mod application;
pub mod audit;
pub mod config;
pub mod db;
pub mod domain;
pub mod infrastructure;
pub mod pix;
pub mod schema;

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::domain::errors::DomainError;

pub use application::bill_service::BillService;
pub use application::billing_service::BillingService;
pub use config::Settings;
pub use db::{create_pool, DbPool};
pub use domain::money::Money;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Repository(e.to_string()))?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}
