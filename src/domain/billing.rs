use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeKind {
    Fixed,
    Variable,
    Extra,
}

impl ChargeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::Fixed => "fixed",
            ChargeKind::Variable => "variable",
            ChargeKind::Extra => "extra",
        }
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(ChargeKind::Fixed),
            "variable" => Ok(ChargeKind::Variable),
            "extra" => Ok(ChargeKind::Extra),
            other => Err(format!("unknown charge kind '{}'", other)),
        }
    }
}

/// One configured row of a billing. Variable items carry no amount; the
/// value is supplied per bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeItem {
    pub id: Option<i64>,
    pub description: String,
    pub kind: ChargeKind,
    pub amount: Money,
}

impl ChargeItem {
    pub fn fixed(description: impl Into<String>, amount: Money) -> Self {
        Self {
            id: None,
            description: description.into(),
            kind: ChargeKind::Fixed,
            amount,
        }
    }

    pub fn variable(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: description.into(),
            kind: ChargeKind::Variable,
            amount: Money::ZERO,
        }
    }
}

/// Standing configuration for a rented unit.
///
/// `uuid` is assigned on construction and never changes; `id` is filled in
/// by the repository on first persist. The `pix_*` fields override the
/// system-wide payment defaults when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    pub id: Option<i64>,
    uuid: Uuid,
    pub name: String,
    pub description: String,
    pub items: Vec<ChargeItem>,
    pub pix_key: Option<String>,
    pub pix_merchant_name: Option<String>,
    pub pix_merchant_city: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Billing {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        items: Vec<ChargeItem>,
    ) -> Self {
        Self::with_uuid(Uuid::new_v4(), name, description, items)
    }

    /// Rebuild a billing whose uuid was assigned earlier (e.g. loaded from
    /// storage).
    pub fn with_uuid(
        uuid: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        items: Vec<ChargeItem>,
    ) -> Self {
        Self {
            id: None,
            uuid,
            name: name.into(),
            description: description.into(),
            items,
            pix_key: None,
            pix_merchant_name: None,
            pix_merchant_city: None,
            created_at: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn with_pix_key(mut self, key: impl Into<String>) -> Self {
        self.pix_key = Some(key.into());
        self
    }

    /// Items are replaced as a whole; there is no per-item patching.
    pub fn replace_items(&mut self, items: Vec<ChargeItem>) {
        self.items = items;
    }
}
