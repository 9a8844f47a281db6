//! Quarters and per-quarter amount tracking
//!
//! PRE line items, receipts, and realignments all carry amounts split across
//! the four fiscal quarters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// A fiscal quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// All quarters in order
    pub fn all() -> [Quarter; 4] {
        [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4]
    }

    /// The display label ("Q1".."Q4")
    pub fn label(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Quarter {
    type Err = QuarterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" | "1" => Ok(Quarter::Q1),
            "Q2" | "2" => Ok(Quarter::Q2),
            "Q3" | "3" => Ok(Quarter::Q3),
            "Q4" | "4" => Ok(Quarter::Q4),
            other => Err(QuarterParseError(other.to_string())),
        }
    }
}

/// Error type for quarter parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterParseError(String);

impl fmt::Display for QuarterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid quarter: {} (expected Q1-Q4)", self.0)
    }
}

impl std::error::Error for QuarterParseError {}

/// Amounts split across the four quarters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterAmounts {
    #[serde(default)]
    pub q1: Money,
    #[serde(default)]
    pub q2: Money,
    #[serde(default)]
    pub q3: Money,
    #[serde(default)]
    pub q4: Money,
}

impl QuarterAmounts {
    /// All-zero amounts
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from four centavo values (mostly for tests and the parser)
    pub fn new(q1: Money, q2: Money, q3: Money, q4: Money) -> Self {
        Self { q1, q2, q3, q4 }
    }

    /// Total across all quarters
    pub fn total(&self) -> Money {
        self.q1 + self.q2 + self.q3 + self.q4
    }

    /// Amount for a specific quarter
    pub fn get(&self, quarter: Quarter) -> Money {
        match quarter {
            Quarter::Q1 => self.q1,
            Quarter::Q2 => self.q2,
            Quarter::Q3 => self.q3,
            Quarter::Q4 => self.q4,
        }
    }

    /// Set the amount for a specific quarter
    pub fn set(&mut self, quarter: Quarter, amount: Money) {
        match quarter {
            Quarter::Q1 => self.q1 = amount,
            Quarter::Q2 => self.q2 = amount,
            Quarter::Q3 => self.q3 = amount,
            Quarter::Q4 => self.q4 = amount,
        }
    }

    /// Add to a specific quarter
    pub fn add(&mut self, quarter: Quarter, amount: Money) {
        self.set(quarter, self.get(quarter) + amount);
    }

    /// Subtract from a specific quarter
    pub fn subtract(&mut self, quarter: Quarter, amount: Money) {
        self.set(quarter, self.get(quarter) - amount);
    }

    /// Quarters with non-zero amounts, in order
    pub fn nonzero(&self) -> Vec<(Quarter, Money)> {
        Quarter::all()
            .into_iter()
            .filter_map(|q| {
                let amount = self.get(q);
                if amount.is_zero() {
                    None
                } else {
                    Some((q, amount))
                }
            })
            .collect()
    }

    /// Whether every quarter is zero
    pub fn is_zero(&self) -> bool {
        self.total().is_zero() && self.nonzero().is_empty()
    }

    /// Whether any quarter is negative
    pub fn any_negative(&self) -> bool {
        Quarter::all().into_iter().any(|q| self.get(q).is_negative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts() -> QuarterAmounts {
        QuarterAmounts::new(
            Money::from_pesos(100),
            Money::from_pesos(200),
            Money::zero(),
            Money::from_pesos(50),
        )
    }

    #[test]
    fn test_quarter_parse() {
        assert_eq!("Q1".parse::<Quarter>().unwrap(), Quarter::Q1);
        assert_eq!("q3".parse::<Quarter>().unwrap(), Quarter::Q3);
        assert_eq!("4".parse::<Quarter>().unwrap(), Quarter::Q4);
        assert!("Q5".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_total() {
        assert_eq!(amounts().total(), Money::from_pesos(350));
    }

    #[test]
    fn test_get_set() {
        let mut a = amounts();
        assert_eq!(a.get(Quarter::Q2), Money::from_pesos(200));
        a.set(Quarter::Q3, Money::from_pesos(75));
        assert_eq!(a.get(Quarter::Q3), Money::from_pesos(75));
    }

    #[test]
    fn test_add_subtract() {
        let mut a = amounts();
        a.add(Quarter::Q1, Money::from_pesos(25));
        assert_eq!(a.q1, Money::from_pesos(125));
        a.subtract(Quarter::Q1, Money::from_pesos(100));
        assert_eq!(a.q1, Money::from_pesos(25));
    }

    #[test]
    fn test_nonzero() {
        let nz = amounts().nonzero();
        assert_eq!(nz.len(), 3);
        assert_eq!(nz[0], (Quarter::Q1, Money::from_pesos(100)));
        assert_eq!(nz[2], (Quarter::Q4, Money::from_pesos(50)));
    }

    #[test]
    fn test_is_zero() {
        assert!(QuarterAmounts::zero().is_zero());
        assert!(!amounts().is_zero());
    }

    #[test]
    fn test_any_negative() {
        let mut a = amounts();
        assert!(!a.any_negative());
        a.subtract(Quarter::Q3, Money::from_pesos(1));
        assert!(a.any_negative());
    }

    #[test]
    fn test_serde_defaults() {
        // Older files may omit quarters entirely
        let a: QuarterAmounts = serde_json::from_str(r#"{"q1": 1000}"#).unwrap();
        assert_eq!(a.q1, Money::from_centavos(1000));
        assert_eq!(a.q4, Money::zero());
    }
}
