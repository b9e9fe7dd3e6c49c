//! Settings read from the environment (and `.env` when present).
//!
//! | variable            | default      |
//! |---------------------|--------------|
//! | `DATABASE_URL`      | required     |
//! | `STORAGE_BACKEND`   | `local`      |
//! | `STORAGE_DIR`       | `./invoices` |
//! | `STORAGE_PREFIX`    | none         |
//! | `PIX_KEY`           | none         |
//! | `PIX_MERCHANT_NAME` | none         |
//! | `PIX_MERCHANT_CITY` | none         |

use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_STORAGE_DIR: &str = "./invoices";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Unsupported storage backend '{0}'")]
    UnsupportedBackend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    Local { base_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub kind: StorageKind,
    /// Optional directory every storage key is nested under.
    pub prefix: Option<String>,
}

/// System-wide payment defaults; a billing's own values win over these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixSettings {
    pub key: Option<String>,
    pub merchant_name: Option<String>,
    pub merchant_city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub storage: StorageSettings,
    pub pix: PixSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let kind = match get("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageKind::Local {
                base_dir: PathBuf::from(
                    get("STORAGE_DIR").unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string()),
                ),
            },
            other => return Err(ConfigError::UnsupportedBackend(other.to_string())),
        };

        let prefix = get("STORAGE_PREFIX")
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            database_url,
            storage: StorageSettings { kind, prefix },
            pix: PixSettings {
                key: get("PIX_KEY"),
                merchant_name: get("PIX_MERCHANT_NAME"),
                merchant_city: get("PIX_MERCHANT_CITY"),
            },
        })
    }
}
