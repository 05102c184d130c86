//! Money type for representing expense amounts
//!
//! Amounts are exact decimals. On disk an amount is a plain JSON number, the
//! layout the collection has always used, and whatever number was stored is
//! written back unchanged: only display rounds to hundredths.
//!
//! There is no `Add` impl. Sums go through [`Money::checked_add`] or
//! [`Money::checked_sum`] so an overflowing total is reported instead of
//! panicking.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// Currency symbols accepted (and stripped) when parsing user input
const CURRENCY_SYMBOLS: [char; 4] = ['₹', '$', '€', '£'];

/// A monetary amount in units of the currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Create a Money amount from hundredths
    ///
    /// # Examples
    /// ```
    /// use expense_tracker::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// ```
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Create a Money amount from whole units
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// `self + other`, or `None` when the result does not fit
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum of `amounts`, or `None` as soon as a partial sum overflows
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// The amount rounded to hundredths, half away from zero
    pub fn round_to_cents(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// The exact amount without trailing zeros, e.g. "12.345" or "50"
    pub fn to_exact_string(&self) -> String {
        self.0.normalize().to_string()
    }

    /// Parse an amount typed by the user
    ///
    /// Accepts "10.50", "-10.50", "₹10.50", "$10", "1,250.75", ".5". The
    /// value is kept exactly as typed; nothing is rounded.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s;
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let s = s.trim_start_matches(&CURRENCY_SYMBOLS[..]).trim();
        let s: String = s.chars().filter(|c| *c != ',').collect();

        if s.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let invalid = || MoneyParseError::InvalidFormat(original.trim().to_string());

        let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
        let points = s.chars().filter(|c| *c == '.').count();
        if digits == 0 || points > 1 || digits + points != s.len() {
            return Err(invalid());
        }

        let s = s.strip_suffix('.').unwrap_or(&s);
        let value = if s.starts_with('.') {
            Decimal::from_str(&format!("0{}", s))
        } else {
            Decimal::from_str(s)
        }
        .map_err(|_| invalid())?;
        Ok(Self(if negative { -value } else { value }))
    }

    /// Format with a currency symbol, e.g. "₹1250.00"
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let rounded = self.round_to_cents();
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        format!("{}{}{:.2}", sign, symbol, rounded.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents();
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        write!(f, "{}{:.2}", sign, rounded.abs())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts are written as integers ("amount": 100)
        if self.0.fract().is_zero() {
            if let Some(units) = self.0.to_i64() {
                return serializer.serialize_i64(units);
            }
        }
        // Going through the decimal text gives the closest f64, which
        // serde_json prints back in its shortest form.
        let value: f64 = self
            .0
            .to_string()
            .parse()
            .map_err(|e| <S::Error as ser::Error>::custom(format!("amount {}: {}", self.0, e)))?;
        serializer.serialize_f64(value)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
        Ok(Money(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
        if !value.is_finite() {
            return Err(E::custom(format!("amount is not finite: {}", value)));
        }
        // f64's Display is the shortest text that reads back as the same
        // number, so the decimal matches what was stored.
        Decimal::from_str(&value.to_string())
            .map(Money)
            .map_err(|_| E::custom(format!("amount out of range: {}", value)))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::Empty => write!(f, "Amount is required"),
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid amount: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m, Money::parse("10.5").unwrap());
        assert_eq!(m.to_string(), "10.50");
        assert_eq!(Money::from_units(3), Money::from_cents(300));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_cents(5).format_with_symbol("₹"), "₹0.05");
        assert_eq!(Money::from_cents(-250).format_with_symbol("$"), "-$2.50");
        assert_eq!(Money::parse("2.345").unwrap().to_string(), "2.35");
        assert_eq!(Money::parse("-0.001").unwrap().format_with_symbol("₹"), "₹0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap(), Money::from_cents(1050));
        assert_eq!(Money::parse("₹10.50").unwrap(), Money::from_cents(1050));
        assert_eq!(Money::parse("$10").unwrap(), Money::from_units(10));
        assert_eq!(Money::parse("-10.50").unwrap(), Money::from_cents(-1050));
        assert_eq!(Money::parse(".5").unwrap(), Money::from_cents(50));
        assert_eq!(Money::parse("5.").unwrap(), Money::from_units(5));
        assert_eq!(Money::parse("1,250.75").unwrap(), Money::from_cents(125075));
        assert!(Money::parse("0").unwrap().is_zero());
        assert_eq!(
            Money::parse("2.345").unwrap().as_decimal(),
            Decimal::new(2345, 3)
        );
    }

    #[test]
    fn test_exact_string_keeps_every_digit() {
        assert_eq!(Money::parse("12.345").unwrap().to_exact_string(), "12.345");
        assert_eq!(Money::from_cents(1050).to_exact_string(), "10.5");
        assert_eq!(Money::from_units(50).to_exact_string(), "50");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), Err(MoneyParseError::Empty));
        assert_eq!(Money::parse("  ₹ "), Err(MoneyParseError::Empty));
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("12abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("--5").is_err());
        assert!(Money::parse("1e5").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("99999999999999999999999999999999").is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!((-a).abs(), a);
        assert_eq!(Money::checked_sum([a, b, b]), Some(Money::from_cents(2000)));
        assert_eq!(Money::checked_sum([]), Some(Money::zero()));

        let max = Money::from_decimal(Decimal::MAX);
        assert_eq!(max.checked_add(Money::from_units(1)), None);
        assert_eq!(Money::checked_sum([max, max, -max]), None);
    }

    #[test]
    fn test_large_amounts_add_without_overflow() {
        let big = Money::parse("90000000000000000").unwrap();
        let total = Money::checked_sum([big, big]).unwrap();
        assert_eq!(total, Money::parse("180000000000000000").unwrap());
    }

    #[test]
    fn test_serialization_is_a_decimal_number() {
        assert_eq!(serde_json::to_string(&Money::from_units(100)).unwrap(), "100");
        assert_eq!(serde_json::to_string(&Money::from_cents(1250)).unwrap(), "12.5");
        assert_eq!(serde_json::to_string(&Money::from_cents(-1250)).unwrap(), "-12.5");

        let whole: Money = serde_json::from_str("150").unwrap();
        assert_eq!(whole, Money::from_units(150));
        let fractional: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(fractional, Money::from_cents(1999));
    }

    #[test]
    fn test_stored_numbers_are_written_back_unchanged() {
        for text in ["12.345", "0.1", "-3.3333", "100", "0.30000000000000004", "1e20"] {
            let amount: Money = serde_json::from_str(text).unwrap();
            assert_eq!(serde_json::to_string(&amount).unwrap(), text);
        }
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert!(serde_json::from_str::<Money>("\"12\"").is_err());
        assert!(serde_json::from_str::<Money>("null").is_err());
    }
}
