//! Fixed-point money amounts
//!
//! Amounts are whole cents in an `i64`. Every total in a report is a sum of
//! these, so aggregation is exact no matter how many transactions are folded
//! together.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create an amount from cents
    ///
    /// # Examples
    /// ```
    /// use expense_tracker::models::Money;
    /// assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The zero amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// The amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Mean of `count` items totalling `self`, rounded half away from zero
    /// to the cent. Zero items average to zero.
    pub fn average(&self, count: usize) -> Self {
        if count == 0 {
            return Self::zero();
        }
        let count = count as i64;
        let half = count / 2;
        let rounded = if self.0 >= 0 {
            (self.0 + half) / count
        } else {
            (self.0 - half) / count
        };
        Self(rounded)
    }

    /// `self` as a percentage of `base`, or `None` when `base` is zero
    pub fn percent_of(&self, base: Money) -> Option<f64> {
        if base.is_zero() {
            None
        } else {
            Some(self.0 as f64 / base.0 as f64 * 100.0)
        }
    }

    /// Parse a user-entered amount
    ///
    /// Accepts `10`, `10.5`, `10.50`, `$10.50`, `1,234.56` and a leading `-`.
    /// More than two fractional digits is rejected rather than rounded.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let invalid = || MoneyParseError::InvalidFormat(s.to_string());
        let trimmed = s.trim();

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let rest: String = rest.chars().filter(|c| *c != ',').collect();

        let (whole, fraction) = match rest.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (rest.as_str(), ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with an explicit currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }

    /// Format with an explicit sign, as used for net figures (`+$5.00`)
    pub fn format_signed(&self, symbol: &str) -> String {
        if self.is_negative() {
            self.format_with_symbol(symbol)
        } else {
            format!("+{}", self.format_with_symbol(symbol))
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooPrecise(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid amount: {}", s),
            MoneyParseError::TooPrecise(s) => {
                write!(f, "Amount has more than two decimal places: {}", s)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-$10.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
    }

    #[test]
    fn test_signed_format() {
        assert_eq!(Money::from_cents(500).format_signed("€"), "+€5.00");
        assert_eq!(Money::from_cents(-500).format_signed("€"), "-€5.00");
        assert_eq!(Money::zero().format_signed("$"), "+$0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse(".05").unwrap().cents(), 5);
        assert_eq!(Money::parse("1,234.56").unwrap().cents(), 123456);
    }

    #[test]
    fn test_parse_rejects_garbage_and_extra_precision() {
        assert!(matches!(
            Money::parse("abc"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Money::parse("1.2.3"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(Money::parse(""), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!(
            Money::parse("0.001"),
            Err(MoneyParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        assert_eq!(Money::from_cents(1000).average(3).cents(), 333);
        assert_eq!(Money::from_cents(1001).average(2).cents(), 501);
        assert_eq!(Money::from_cents(-1001).average(2).cents(), -501);
        assert_eq!(Money::from_cents(1000).average(0), Money::zero());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(Money::from_cents(50).percent_of(Money::from_cents(200)), Some(25.0));
        assert_eq!(Money::from_cents(50).percent_of(Money::zero()), None);
    }

    #[test]
    fn test_repeated_addition_is_exact() {
        let total: Money = std::iter::repeat(Money::from_cents(10)).take(1000).sum();
        assert_eq!(total, Money::from_cents(10_000));
    }
}
