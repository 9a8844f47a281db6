//! Fiscal year representation
//!
//! Budgets are keyed by fiscal year. Both single-year ("2025") and spanning
//! ("2025-2026") forms appear in practice; the start year drives ordering and
//! the past-year archive sweep.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fiscal year label with a parsed start year
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(String);

impl FiscalYear {
    /// Parse a fiscal year string
    ///
    /// Accepts "2025" and "2025-2026". The second year, when present, must be
    /// numeric but is otherwise unconstrained (campuses label spanning years
    /// inconsistently).
    pub fn parse(s: &str) -> Result<Self, FiscalYearParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FiscalYearParseError::Empty);
        }

        let mut parts = s.splitn(2, '-');
        let start = parts.next().unwrap_or_default();
        if start.len() != 4 || start.parse::<i32>().is_err() {
            return Err(FiscalYearParseError::InvalidFormat(s.to_string()));
        }

        if let Some(end) = parts.next() {
            if end.parse::<i32>().is_err() {
                return Err(FiscalYearParseError::InvalidFormat(s.to_string()));
            }
        }

        Ok(Self(s.to_string()))
    }

    /// The fiscal year containing today
    pub fn current() -> Self {
        Self(chrono::Local::now().year().to_string())
    }

    /// The start year of the fiscal year
    ///
    /// Parsing validates the format, but stored files can be hand-edited, so
    /// a malformed label reads as year 0 rather than panicking.
    pub fn start_year(&self) -> i32 {
        self.0
            .get(..4)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// Whether this fiscal year's coverage ended before the given year
    pub fn is_past(&self, current_year: i32) -> bool {
        self.start_year() < current_year
    }

    /// The raw label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FiscalYear {
    type Err = FiscalYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for FiscalYear {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.start_year()
            .cmp(&other.start_year())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for FiscalYear {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Error type for fiscal year parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiscalYearParseError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for FiscalYearParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiscalYearParseError::Empty => write!(f, "Fiscal year cannot be empty"),
            FiscalYearParseError::InvalidFormat(s) => {
                write!(f, "Invalid fiscal year format: {}", s)
            }
        }
    }
}

impl std::error::Error for FiscalYearParseError {}
