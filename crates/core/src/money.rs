//! Rupee amounts using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of Indian rupees.
///
/// Serialised as a decimal string (`"3000.00"`) so clients never see float
/// rounding. `Display` renders the rupee sign with Indian digit grouping.
///
/// ```
/// use rust_decimal::Decimal;
/// use xstore_core::Money;
///
/// let amount = Money::new(Decimal::new(12_345_650, 2));
/// assert_eq!(amount.to_string(), "₹1,23,456.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create an amount from a decimal number of rupees.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Zero rupees.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// How much must be added to reach `target`; zero if already reached.
    #[must_use]
    pub fn shortfall_to(self, target: Self) -> Self {
        if self >= target {
            Self::zero()
        } else {
            Self(target.0 - self.0)
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let plain = format!("{:.2}", rounded.abs());
        let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
        write!(f, "{sign}₹{}.{fraction}", group_indian(whole))
    }
}

/// Insert separators the Indian way: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2);
    for (i, c) in digits.chars().enumerate() {
        let from_right = len - i;
        if i > 0 && from_right >= 3 && (from_right - 3) % 2 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_indian_grouping() {
        assert_eq!(Money::zero().to_string(), "₹0.00");
        assert_eq!(Money::from_rupees(999).to_string(), "₹999.00");
        assert_eq!(Money::from_rupees(3000).to_string(), "₹3,000.00");
        assert_eq!(Money::from_rupees(123_456).to_string(), "₹1,23,456.00");
        assert_eq!(Money::from_rupees(12_345_678).to_string(), "₹1,23,45,678.00");
        assert_eq!(Money::new(Decimal::new(-1050, 2)).to_string(), "-₹10.50");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Money::new(Decimal::new(4250, 2));
        assert_eq!(unit.times(4), Money::from_rupees(170));
        let total: Money = [Money::from_rupees(10), Money::from_rupees(5)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_rupees(15));
    }

    #[test]
    fn test_shortfall() {
        let target = Money::from_rupees(3000);
        assert_eq!(Money::from_rupees(2500).shortfall_to(target), Money::from_rupees(500));
        assert_eq!(Money::from_rupees(3000).shortfall_to(target), Money::zero());
        assert_eq!(Money::from_rupees(4000).shortfall_to(target), Money::zero());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::new(Decimal::new(300_050, 2)))
            .unwrap_or_default();
        assert_eq!(json, "\"3000.50\"");
    }
}
