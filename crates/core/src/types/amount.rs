//! Rupee amounts using decimal arithmetic.
//!
//! Documents carry amounts as plain JSON numbers (whole or fractional rupees).
//! [`Amount`] keeps them as [`Decimal`] internally and writes them back as
//! numbers, so the wire format stays what the storefront produces.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// An amount in Indian rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal rupee value.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// The amount in paise, rounded half away from zero.
    ///
    /// Returns `None` if the value does not fit in an `i64`.
    #[must_use]
    pub fn to_paise(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Amount {
    /// Formats as `₹1299` for whole rupees and `₹1299.50` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded.fract().is_zero() {
            write!(f, "₹{}", rounded.trunc().normalize())
        } else {
            write!(f, "₹{rounded:.2}")
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Amount {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_i64() {
            Some(whole) if self.0.fract().is_zero() => serializer.serialize_i64(whole),
            _ => serializer.serialize_f64(self.0.to_f64().unwrap_or_default()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Decimal::from_f64(v)
            .map(Amount)
            .ok_or_else(|| E::custom(format!("amount out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.trim()
            .parse::<Decimal>()
            .map(Amount)
            .map_err(|_| E::custom(format!("invalid amount: {v:?}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_display_whole_and_fractional() {
        assert_eq!(amount("1299").to_string(), "₹1299");
        assert_eq!(amount("1299.00").to_string(), "₹1299");
        assert_eq!(amount("499.5").to_string(), "₹499.50");
    }

    #[test]
    fn test_to_paise_rounds() {
        assert_eq!(amount("1299").to_paise(), Some(129_900));
        assert_eq!(amount("10.005").to_paise(), Some(1001));
        assert_eq!(amount("0.1").to_paise(), Some(10));
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("1299").unwrap();
        assert_eq!(a, Amount::from_rupees(1299));

        let b: Amount = serde_json::from_str("499.5").unwrap();
        assert_eq!(b, amount("499.5"));

        let c: Amount = serde_json::from_str("\" 850 \"").unwrap();
        assert_eq!(c, Amount::from_rupees(850));

        assert!(serde_json::from_str::<Amount>("\"free\"").is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&Amount::from_rupees(1299)).unwrap(), "1299");
        assert_eq!(serde_json::to_string(&amount("499.5")).unwrap(), "499.5");
    }

    #[test]
    fn test_line_total_and_sum() {
        let line = Amount::from_rupees(450) * 3;
        assert_eq!(line, Amount::from_rupees(1350));

        let total: Amount = [Amount::from_rupees(100), amount("0.5")].iter().sum();
        assert_eq!(total, amount("100.5"));
    }
}
