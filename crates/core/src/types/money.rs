//! Whole-rupee money amounts.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Rupees`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MoneyError {
    /// The amount is negative.
    #[error("amount cannot be negative (got {0})")]
    Negative(f64),
    /// The amount is NaN or infinite.
    #[error("amount must be a finite number")]
    NotFinite,
}

/// A non-negative amount of whole rupees.
///
/// The boutique gateway quotes every price, discount, and fee in whole
/// rupees. Percentage coupons can produce fractional discounts on the wire,
/// so deserialization accepts both integer and float JSON numbers and rounds
/// to the nearest rupee; serialization always emits an integer.
///
/// ## Examples
///
/// ```
/// use zari_core::Rupees;
///
/// let price = Rupees::new(1600);
/// assert_eq!(price.paise(), 160_000);
/// assert_eq!(Rupees::new(100).saturating_sub(Rupees::new(250)), Rupees::ZERO);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
)]
#[serde(transparent)]
pub struct Rupees(u64);

impl Rupees {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole rupees.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// The amount in whole rupees.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// The amount in paise (minor units), as the payment widget expects.
    #[must_use]
    pub const fn paise(self) -> u64 {
        self.0 * 100
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtract, clamping at zero. Totals never go negative.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Construct from a float value off the wire, rounding to the nearest
    /// rupee.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative, NaN, or infinite.
    pub fn from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        if value < 0.0 {
            return Err(MoneyError::Negative(value));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(value.round() as u64))
    }
}

impl Add for Rupees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Rupees {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Rupees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Rupees {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paise_conversion() {
        assert_eq!(Rupees::new(1600).paise(), 160_000);
        assert_eq!(Rupees::ZERO.paise(), 0);
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        assert_eq!(
            Rupees::new(100).saturating_sub(Rupees::new(250)),
            Rupees::ZERO
        );
        assert_eq!(
            Rupees::new(250).saturating_sub(Rupees::new(100)),
            Rupees::new(150)
        );
    }

    #[test]
    fn test_sum_and_mul() {
        let total: Rupees = [Rupees::new(800), Rupees::new(800)].into_iter().sum();
        assert_eq!(total, Rupees::new(1600));
        assert_eq!(Rupees::new(800) * 2, Rupees::new(1600));
    }

    #[test]
    fn test_from_f64_rounds() {
        assert_eq!(Rupees::from_f64(159.9).unwrap(), Rupees::new(160));
        assert_eq!(Rupees::from_f64(159.4).unwrap(), Rupees::new(159));
        assert_eq!(Rupees::from_f64(0.0).unwrap(), Rupees::ZERO);
    }

    #[test]
    fn test_from_f64_rejects_negative_and_nan() {
        assert!(matches!(
            Rupees::from_f64(-1.0),
            Err(MoneyError::Negative(_))
        ));
        assert!(matches!(
            Rupees::from_f64(f64::NAN),
            Err(MoneyError::NotFinite)
        ));
        assert!(matches!(
            Rupees::from_f64(f64::INFINITY),
            Err(MoneyError::NotFinite)
        ));
    }

    #[test]
    fn test_deserialize_integer_and_float() {
        let from_int: Rupees = serde_json::from_str("1600").unwrap();
        assert_eq!(from_int, Rupees::new(1600));

        let from_float: Rupees = serde_json::from_str("159.9").unwrap();
        assert_eq!(from_float, Rupees::new(160));

        assert!(serde_json::from_str::<Rupees>("-5").is_err());
    }

    #[test]
    fn test_serialize_as_integer() {
        let json = serde_json::to_string(&Rupees::new(1700)).unwrap();
        assert_eq!(json, "1700");
    }

    #[test]
    fn test_display() {
        assert_eq!(Rupees::new(2999).to_string(), "₹2999");
    }
}
