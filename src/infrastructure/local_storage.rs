use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::DomainError;
use crate::domain::ports::StorageBackend;

/// Stores invoices as files under a base directory. Locations are absolute
/// paths.
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| {
            DomainError::Storage(format!("cannot create {}: {}", base_dir.display(), e))
        })?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(DomainError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.base_dir.join(relative))
    }
}

impl StorageBackend for LocalStorage {
    fn save(&self, key: &str, data: &[u8]) -> Result<String, DomainError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DomainError::Storage(e.to_string()))?;
        }
        fs::write(&path, data).map_err(|e| DomainError::Storage(e.to_string()))?;

        let resolved = fs::canonicalize(&path).map_err(|e| DomainError::Storage(e.to_string()))?;
        let resolved = resolved.to_string_lossy().into_owned();
        log::debug!("Saved {} ({} bytes) to {}", key, data.len(), resolved);
        Ok(resolved)
    }

    fn get_url(&self, location: &str) -> Result<String, DomainError> {
        let path = self.base_dir.join(location);
        let resolved = fs::canonicalize(&path).unwrap_or(path);
        let resolved = resolved.to_string_lossy().into_owned();
        log::debug!("Resolved URL for {}: {}", location, resolved);
        Ok(resolved)
    }
}
