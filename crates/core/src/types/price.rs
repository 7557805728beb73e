//! Type-safe price representation using decimal arithmetic.
//!
//! Catalogue documents store `stdPrice` and `supplierPrice` as integer minor
//! units (pence). Aggregations keep working in minor units; `Price` is the
//! human-facing view of those integers.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., pounds, not pence).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from integer minor units (e.g., `650` pence is `6.50`).
    #[must_use]
    pub fn from_minor_units(minor_units: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(minor_units, 2), currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    GBP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GBP => "£",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_units() {
        let price = Price::from_minor_units(650, CurrencyCode::GBP);
        assert_eq!(price.amount, Decimal::new(650, 2));
        assert_eq!(price.to_string(), "£6.50");
    }

    #[test]
    fn test_display_pads_to_two_places() {
        let price = Price::from_minor_units(27_260, CurrencyCode::USD);
        assert_eq!(price.to_string(), "$272.60");
    }

    #[test]
    fn test_default_currency_is_gbp() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::GBP);
    }
}
