//! Money type for representing signed monetary amounts
//!
//! Amounts are kept as exact decimals. Whole numbers are written back as JSON
//! integers and fractional amounts as JSON floats, so a document keeps the
//! shape it was read in. Currency and locale formatting belong to the caller.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Neg;

/// A signed monetary amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Create a Money amount from a whole number
    ///
    /// # Examples
    /// ```
    /// use budget_store::models::Money;
    /// let amount = Money::from_i64(1050);
    /// assert_eq!(amount.to_string(), "1050");
    /// ```
    pub fn from_i64(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount.normalize())
    }

    /// Create a Money amount from a float
    ///
    /// Returns `None` for NaN, infinities and values outside the decimal range.
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        Decimal::from_f64(amount).map(Self::from_decimal)
    }

    /// Create a zero Money amount
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Check if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Get the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Add two amounts, `None` on overflow
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self::from_decimal)
    }

    /// Subtract two amounts, `None` on overflow
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self::from_decimal)
    }

    /// Sum a sequence of amounts, `None` on overflow
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |acc, m| acc.checked_add(m))
    }

    fn is_whole(&self) -> bool {
        self.0.fract().is_zero()
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self::from_i64(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            if let Some(whole) = self.0.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        match self.0.to_f64() {
            Some(float) => serializer.serialize_f64(float),
            None => Err(serde::ser::Error::custom(format!(
                "amount {} cannot be written as a number",
                self.0
            ))),
        }
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a finite number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_i64(1000);
        let b = Money::from_i64(500);

        assert_eq!(a.checked_add(b), Some(Money::from_i64(1500)));
        assert_eq!(a.checked_sub(b), Some(Money::from_i64(500)));
        assert_eq!(-a, Money::from_i64(-1000));
        assert_eq!(b.checked_sub(a).unwrap().abs(), b);
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Money::from_decimal(Decimal::MAX);
        assert_eq!(max.checked_add(Money::from_i64(1)), None);
        assert_eq!(Money::checked_sum([max, max]), None);
    }

    #[test]
    fn test_i64_extremes_do_not_overflow() {
        let total = Money::checked_sum([Money::from_i64(i64::MAX), Money::from_i64(1)]).unwrap();
        assert_eq!(total.as_decimal(), Decimal::from(i64::MAX) + dec!(1));
    }

    #[test]
    fn test_is_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_i64(100).is_positive());
        assert!(Money::from_i64(-100).is_negative());
        assert!(!Money::zero().is_negative());
    }

    #[test]
    fn test_checked_sum() {
        let amounts = [Money::from_i64(100), Money::from_i64(200), Money::from_i64(-50)];
        assert_eq!(Money::checked_sum(amounts), Some(Money::from_i64(250)));
    }

    #[test]
    fn test_whole_amounts_serialize_as_integers() {
        let m = Money::from_i64(-1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "-1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }

    #[test]
    fn test_fractional_amounts_keep_their_value() {
        let m: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(m.as_decimal(), dec!(12.5));
        assert_eq!(serde_json::to_string(&m).unwrap(), "12.5");

        // 12.0 is the same amount as 12
        let whole: Money = serde_json::from_str("12.0").unwrap();
        assert_eq!(serde_json::to_string(&whole).unwrap(), "12");
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert!(serde_json::from_str::<Money>("\"5\"").is_err());
        assert!(Money::from_f64(f64::NAN).is_none());
        assert!(Money::from_f64(f64::INFINITY).is_none());
    }
}
