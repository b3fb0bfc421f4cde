//! Dollar amounts with exactly two decimal places.
//!
//! ACH records store amounts as whole cents. `Dollars` is the form they
//! take in reports and in DNE payloads, using `rust_decimal` so nothing
//! passes through floating point.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// A non-negative dollar amount kept at a scale of 2.
///
/// # Examples
///
/// ```
/// use ach_engine::Dollars;
///
/// assert_eq!(Dollars::from_cents(123_456).to_string(), "1234.56");
/// assert_eq!("7.5".parse::<Dollars>().unwrap().cents(), Some(750));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Dollars(Decimal);

impl Dollars {
    pub const SCALE: u32 = 2;

    pub const ZERO: Self = Dollars(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Dollars(normalized)
    }

    /// Converts a whole number of cents.
    pub fn from_cents(cents: u64) -> Self {
        Dollars(Decimal::from_i128_with_scale(i128::from(cents), Self::SCALE))
    }

    /// The amount in whole cents, or `None` if it does not fit.
    pub fn cents(&self) -> Option<u64> {
        let mut scaled = self.0;
        scaled.rescale(Self::SCALE);
        u64::try_from(scaled.mantissa()).ok()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Error parsing a dollar amount.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DollarsError {
    #[error("{0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("amount may not be negative")]
    Negative,

    #[error("amount has more than two decimal places")]
    Precision,
}

impl FromStr for Dollars {
    type Err = DollarsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(DollarsError::Negative);
        }
        if decimal.normalize().scale() > Self::SCALE {
            return Err(DollarsError::Precision);
        }
        Ok(Dollars::new(decimal))
    }
}

impl fmt::Display for Dollars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Dollars {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Dollars::new(self.0 + rhs.0)
    }
}

impl AddAssign for Dollars {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sum for Dollars {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Dollars::ZERO, Add::add)
    }
}

impl Serialize for Dollars {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Dollars::from_cents(0).to_string(), "0.00");
        assert_eq!(Dollars::from_cents(5).to_string(), "0.05");
        assert_eq!(Dollars::from_cents(100_000).to_string(), "1000.00");
        assert_eq!(Dollars::from_cents(9_999_999_999).cents(), Some(9_999_999_999));
    }

    #[test]
    fn test_from_str_normalizes_scale() {
        assert_eq!("12".parse::<Dollars>().unwrap().to_string(), "12.00");
        assert_eq!(" 12345.67 ".parse::<Dollars>().unwrap().cents(), Some(1_234_567));
        assert_eq!("1.50".parse::<Dollars>().unwrap().cents(), Some(150));
    }

    #[test]
    fn test_from_str_rejects() {
        assert!(matches!("-1".parse::<Dollars>(), Err(DollarsError::Negative)));
        assert!(matches!("1.005".parse::<Dollars>(), Err(DollarsError::Precision)));
        assert!(matches!("1.2.3".parse::<Dollars>(), Err(DollarsError::Decimal(_))));
    }

    #[test]
    fn test_sum_preserves_scale() {
        let total: Dollars = [150, 250, 1].into_iter().map(Dollars::from_cents).sum();
        assert_eq!(total.to_string(), "4.01");
        assert!(Dollars::ZERO.is_zero());
    }
}
