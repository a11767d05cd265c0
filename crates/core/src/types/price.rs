//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API sends prices as JSON numbers (`12.5`), so `Price`
//! (de)serializes through `rust_decimal::serde::float` while all arithmetic
//! stays in exact decimals.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The input is negative.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative amount in the shop currency's standard unit (soles, not
/// céntimos).
///
/// ## Examples
///
/// ```
/// use glossy_core::Price;
///
/// let unit = Price::parse("12.50").unwrap();
/// assert_eq!((unit * 3).to_string(), "37.50");
/// assert_eq!(unit.display("S/."), "S/. 12.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer amount of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a price from a decimal string such as `"12.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format for display with a currency symbol (e.g., "S/. 19.99").
    #[must_use]
    pub fn display(&self, symbol: &str) -> String {
        format!("{symbol} {self}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("12.50").unwrap(), Price::from_cents(1250));
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse(" 5 ").unwrap().to_string(), "5.00");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-1.00"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = Price::parse("0.10").unwrap();
        let b = Price::parse("0.20").unwrap();
        assert_eq!(a + b, Price::parse("0.30").unwrap());
        assert_eq!(Price::parse("12.50").unwrap() * 3, Price::from_cents(3750));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(1000), Price::from_cents(550)]
            .into_iter()
            .sum();
        assert_eq!(total.to_string(), "15.50");

        let empty: Price = core::iter::empty().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(Price::from_cents(500).display("S/."), "S/. 5.00");
    }

    #[test]
    fn test_serde_uses_json_numbers() {
        let price: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(price, Price::from_cents(1250));
        assert_eq!(serde_json::to_string(&Price::from_cents(1250)).unwrap(), "12.5");
    }
}
