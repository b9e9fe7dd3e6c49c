pub mod bill_repo;
pub mod billing_repo;
pub mod local_storage;
pub mod models;
#[cfg(test)]
mod test_support;

use crate::config::{StorageKind, StorageSettings};
use crate::domain::billing::ChargeKind;
use crate::domain::errors::DomainError;
use crate::domain::ports::StorageBackend;

pub use bill_repo::DieselBillRepository;
pub use billing_repo::DieselBillingRepository;
pub use local_storage::LocalStorage;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Repository(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Repository(e.to_string())
    }
}

pub(crate) fn parse_kind(text: &str) -> Result<ChargeKind, DomainError> {
    text.parse().map_err(DomainError::Repository)
}

/// Pick the storage backend named in the settings.
pub fn build_storage(settings: &StorageSettings) -> Result<Box<dyn StorageBackend>, DomainError> {
    match &settings.kind {
        StorageKind::Local { base_dir } => Ok(Box::new(LocalStorage::new(base_dir)?)),
    }
}
