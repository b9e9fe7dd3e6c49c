//! Integer-centavos money with Brazilian formatting.
//!
//! Amounts never live as floating point. Text input is parsed as an exact
//! decimal and rounded half-up to the nearest centavo.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CURRENCY_SYMBOL: &str = "R$";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid amount: '{0}'")]
pub struct InvalidAmount(pub String);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount accepted from text: `9.999.999.999,99`, the widest value
    /// a PIX amount field can carry.
    pub const MAX: Money = Money(999_999_999_999);

    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    pub const fn centavos(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Exact sum, `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts.into_iter().try_fold(Money::ZERO, Money::checked_add)
    }

    /// Localized form without currency symbol, e.g. `285000` -> `"2.850,00"`.
    pub fn format(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}{},{:02}", sign, grouped, abs % 100)
    }

    /// `285000` -> `"R$ 2.850,00"`
    pub fn format_brl(self) -> String {
        format!("{} {}", CURRENCY_SYMBOL, self.format())
    }

    /// Plain decimal with a dot and two fractional digits, e.g. `"2850.00"`.
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Parse user-entered text. Accepts `"2850"`, `"2850.00"`, `"2.850,00"`
    /// and `"2850,50"`. When a comma is present, dots are grouping separators
    /// and the comma is the decimal point.
    ///
    /// Returns `None` for blank or non-numeric input, exponent notation, and
    /// anything beyond [`Money::MAX`]; callers decide what an absent value
    /// means.
    pub fn parse(text: &str) -> Option<Money> {
        let text = text.trim();
        let unsigned = text.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(text);
        if unsigned.is_empty()
            || !unsigned
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return None;
        }

        let normalized = if text.contains(',') {
            text.replace('.', "").replace(',', ".")
        } else {
            text.to_string()
        };

        let reais = BigDecimal::from_str(&normalized).ok()?;
        (reais * BigDecimal::from(100))
            .with_scale_round(0, RoundingMode::HalfUp)
            .to_i64()
            .filter(|centavos| centavos.unsigned_abs() <= Money::MAX.0.unsigned_abs())
            .map(Money)
    }
}

impl FromStr for Money {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s).ok_or_else(|| InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_brl())
    }
}

/// Saturates at the `i64` bounds. Totals that must be exact go through
/// [`Money::checked_sum`].
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}
