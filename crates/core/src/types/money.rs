//! Type-safe monetary amounts using decimal arithmetic.
//!
//! The commerce backend reports all amounts in the currency's smallest unit
//! (cents for USD). [`Money`] converts those minor units into a decimal value
//! once, at the boundary, so display code never does float math on prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Money {
    /// Create a `Money` value from an amount in minor units (e.g., cents).
    #[must_use]
    pub fn from_minor_units(minor_units: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(minor_units, currency_code.decimal_places()),
            currency_code,
        }
    }

    /// The decimal amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency code.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Format for display (e.g., `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// ISO 4217 code in lowercase, as the commerce API uses it.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }

    /// Number of decimal places in the currency's standard unit.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        // All supported currencies are 2-decimal currencies.
        2
    }

    /// Parse a lowercase ISO 4217 code, defaulting to USD for unknown codes.
    ///
    /// The currency only affects the display symbol, so an unknown code
    /// degrades to the store default rather than erroring.
    #[must_use]
    pub fn from_code_or_default(code: &str) -> Self {
        match code {
            "eur" => Self::EUR,
            "gbp" => Self::GBP,
            "cad" => Self::CAD,
            "aud" => Self::AUD,
            _ => Self::USD,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_units() {
        let money = Money::from_minor_units(1999, CurrencyCode::USD);
        assert_eq!(money.display(), "$19.99");
    }

    #[test]
    fn test_zero() {
        let money = Money::from_minor_units(0, CurrencyCode::USD);
        assert_eq!(money.display(), "$0.00");
    }

    #[test]
    fn test_single_digit_cents() {
        let money = Money::from_minor_units(5, CurrencyCode::USD);
        assert_eq!(money.display(), "$0.05");
    }

    #[test]
    fn test_euro_symbol() {
        let money = Money::from_minor_units(1050, CurrencyCode::EUR);
        assert_eq!(money.display(), "\u{20ac}10.50");
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(CurrencyCode::from_code_or_default("usd"), CurrencyCode::USD);
        assert_eq!(CurrencyCode::from_code_or_default("gbp"), CurrencyCode::GBP);
        // Unknown codes fall back to the store default
        assert_eq!(CurrencyCode::from_code_or_default("xyz"), CurrencyCode::USD);
    }

    #[test]
    fn test_display_trait() {
        let money = Money::from_minor_units(123_456, CurrencyCode::USD);
        assert_eq!(money.to_string(), "$1234.56");
    }
}
