use std::collections::HashMap;

use super::bill::LineItem;
use super::billing::{Billing, ChargeKind};
use super::errors::DomainError;
use super::money::Money;

/// A one-off charge added at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraCharge {
    pub description: String,
    pub amount: Money,
}

impl ExtraCharge {
    pub fn new(description: impl Into<String>, amount: Money) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBill {
    pub line_items: Vec<LineItem>,
    pub total: Money,
}

/// Turn a billing's configured items plus per-bill inputs into ordered line
/// items.
///
/// Configured items come first in stored order, then extras in the order
/// given. A variable item missing from `variable_amounts` is billed as zero.
pub fn assemble(
    billing: &Billing,
    variable_amounts: &HashMap<i64, Money>,
    extras: &[ExtraCharge],
) -> Result<AssembledBill, DomainError> {
    let mut line_items = Vec::with_capacity(billing.items.len() + extras.len());

    for item in &billing.items {
        let amount = match item.kind {
            ChargeKind::Variable => {
                let id = item.id.ok_or_else(|| {
                    DomainError::contract(format!(
                        "variable item '{}' has no id",
                        item.description
                    ))
                })?;
                variable_amounts.get(&id).copied().unwrap_or(Money::ZERO)
            }
            ChargeKind::Fixed | ChargeKind::Extra => item.amount,
        };
        line_items.push(LineItem {
            description: item.description.clone(),
            amount,
            kind: item.kind,
            sort_order: line_items.len() as i32,
        });
    }

    for extra in extras {
        line_items.push(LineItem {
            description: extra.description.clone(),
            amount: extra.amount,
            kind: ChargeKind::Extra,
            sort_order: line_items.len() as i32,
        });
    }

    let total = Money::checked_sum(line_items.iter().map(|l| l.amount))
        .ok_or_else(|| DomainError::contract("bill total is out of range"))?;
    Ok(AssembledBill { line_items, total })
}
