//! Money type for representing peso amounts
//!
//! Internally stores amounts in centavos (i64) to avoid floating-point
//! precision issues. Provides safe arithmetic operations and formatting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as centavos (hundredths of a peso)
///
/// Using i64 centavos avoids floating-point precision issues in balance
/// arithmetic, which matters for the fund deduction and realignment paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from centavos
    ///
    /// # Examples
    /// ```
    /// use fundwatch::models::Money;
    /// let amount = Money::from_centavos(1050); // ₱10.50
    /// ```
    pub const fn from_centavos(centavos: i64) -> Self {
        Self(centavos)
    }

    /// Create a Money amount from whole pesos
    pub const fn from_pesos(pesos: i64) -> Self {
        Self(pesos * 100)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in centavos
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Get the whole pesos portion (truncated toward zero)
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Get the centavos portion (0-99)
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "₱10.50", "1,050.25", "10"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        // Handle negative sign at start
        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        // Remove currency symbol and digit grouping if present
        let s = s.strip_prefix('₱').unwrap_or(s).trim();
        let s: String = s.chars().filter(|c| *c != ',').collect();

        let centavos = if s.contains('.') {
            // Decimal format: "10.50"
            let parts: Vec<&str> = s.split('.').collect();
            if parts.len() != 2 {
                return Err(MoneyParseError::InvalidFormat(s.to_string()));
            }

            let pesos: i64 = parts[0]
                .parse()
                .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;

            // Pad or truncate centavos to 2 digits
            let centavo_str = parts[1];
            let centavos: i64 = match centavo_str.len() {
                0 => 0,
                1 => {
                    centavo_str
                        .parse::<i64>()
                        .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
                        * 10
                }
                _ => centavo_str[..2]
                    .parse()
                    .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?,
            };

            pesos * 100 + centavos
        } else {
            // Integer format - assume whole pesos
            s.parse::<i64>()
                .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
                * 100
        };

        Ok(Self(if negative { -centavos } else { centavos }))
    }

    /// Format with a currency symbol and grouped thousands (e.g. "₱1,234.56")
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!(
                "-{}{}.{:02}",
                symbol,
                group_thousands(self.pesos().abs()),
                self.centavos_part()
            )
        } else {
            format!(
                "{}{}.{:02}",
                symbol,
                group_thousands(self.pesos()),
                self.centavos_part()
            )
        }
    }

    /// Ratio of this amount over a base amount, as a percentage
    ///
    /// Returns 0.0 when the base is zero.
    pub fn percent_of(&self, base: Money) -> f64 {
        if base.is_zero() {
            0.0
        } else {
            (self.0 as f64 / base.0 as f64) * 100.0
        }
    }
}

/// Insert comma separators into a non-negative integer
fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("₱"))
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

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
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
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centavos() {
        let m = Money::from_centavos(1050);
        assert_eq!(m.centavos(), 1050);
        assert_eq!(m.pesos(), 10);
        assert_eq!(m.centavos_part(), 50);
    }

    #[test]
    fn test_from_pesos() {
        let m = Money::from_pesos(10);
        assert_eq!(m.centavos(), 1000);
    }

    #[test]
    fn test_display_grouping() {
        assert_eq!(format!("{}", Money::from_centavos(1050)), "₱10.50");
        assert_eq!(format!("{}", Money::from_centavos(0)), "₱0.00");
        assert_eq!(format!("{}", Money::from_centavos(-1050)), "-₱10.50");
        assert_eq!(format!("{}", Money::from_centavos(5)), "₱0.05");
        assert_eq!(format!("{}", Money::from_centavos(123_456_789)), "₱1,234,567.89");
        assert_eq!(format!("{}", Money::from_pesos(1000)), "₱1,000.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_centavos(1000);
        let b = Money::from_centavos(500);

        assert_eq!((a + b).centavos(), 1500);
        assert_eq!((a - b).centavos(), 500);
        assert_eq!((-a).centavos(), -1000);
        assert_eq!((b * 3).centavos(), 1500);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().centavos(), 1050);
        assert_eq!(Money::parse("₱10.50").unwrap().centavos(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().centavos(), -1050);
        assert_eq!(Money::parse("10").unwrap().centavos(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().centavos(), 1050);
        assert_eq!(Money::parse("0.05").unwrap().centavos(), 5);
        assert_eq!(Money::parse("1,234,567.89").unwrap().centavos(), 123_456_789);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("10.5.0").is_err());
    }

    #[test]
    fn test_percent_of() {
        let used = Money::from_pesos(250);
        let total = Money::from_pesos(1000);
        assert!((used.percent_of(total) - 25.0).abs() < f64::EPSILON);
        assert_eq!(used.percent_of(Money::zero()), 0.0);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_centavos(100),
            Money::from_centavos(200),
            Money::from_centavos(300),
        ];
        let total: Money = amounts.into_iter().sum();
        assert_eq!(total.centavos(), 600);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_centavos(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
