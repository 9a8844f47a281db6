//! Approved budget model
//!
//! One approved budget exists per fiscal year. Department allocations are
//! carved out of its remaining balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::fiscal_year::FiscalYear;
use super::ids::BudgetId;
use super::money::Money;

/// The approved budget for a fiscal year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedBudget {
    /// Unique identifier
    pub id: BudgetId,

    /// Budget title (e.g. "General Appropriations 2025")
    pub title: String,

    /// Fiscal year this budget covers; unique across active budgets
    pub fiscal_year: FiscalYear,

    /// Total approved amount
    pub amount: Money,

    /// Amount not yet carved into department allocations
    pub remaining: Money,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Who recorded the budget
    pub created_by: String,

    /// When the budget was recorded
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,

    /// Archive metadata
    #[serde(default)]
    pub archive: ArchiveState,
}

impl ApprovedBudget {
    /// Create a new approved budget; the remaining balance starts at the full
    /// amount.
    pub fn new(
        title: impl Into<String>,
        fiscal_year: FiscalYear,
        amount: Money,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            title: title.into(),
            fiscal_year,
            amount,
            remaining: amount,
            description: String::new(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
            archive: ArchiveState::active(),
        }
    }

    /// Amount already carved into allocations
    pub fn allocated_total(&self) -> Money {
        self.amount - self.remaining
    }

    /// Deduct a carve-out from the remaining balance
    pub fn carve(&mut self, amount: Money) -> Result<(), BudgetValidationError> {
        if amount > self.remaining {
            return Err(BudgetValidationError::InsufficientRemaining {
                needed: amount,
                remaining: self.remaining,
            });
        }
        self.remaining -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return a carve-out to the remaining balance
    pub fn release(&mut self, amount: Money) {
        self.remaining += amount;
        self.updated_at = Utc::now();
    }

    /// Grow or shrink the total amount, keeping the allocated portion intact
    pub fn resize(&mut self, new_amount: Money) -> Result<(), BudgetValidationError> {
        let delta = new_amount - self.amount;
        if (self.remaining + delta).is_negative() {
            return Err(BudgetValidationError::InsufficientRemaining {
                needed: -delta,
                remaining: self.remaining,
            });
        }
        self.amount = new_amount;
        self.remaining += delta;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.title.trim().is_empty() {
            return Err(BudgetValidationError::EmptyTitle);
        }
        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount);
        }
        if self.remaining.is_negative() || self.remaining > self.amount {
            return Err(BudgetValidationError::RemainingOutOfRange);
        }
        Ok(())
    }
}

impl fmt::Display for ApprovedBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.title, self.fiscal_year, self.amount)
    }
}

/// Validation errors for approved budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyTitle,
    NonPositiveAmount,
    RemainingOutOfRange,
    InsufficientRemaining { needed: Money, remaining: Money },
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Budget title cannot be empty"),
            Self::NonPositiveAmount => write!(f, "Budget amount must be greater than zero"),
            Self::RemainingOutOfRange => {
                write!(f, "Remaining balance must stay between zero and the total")
            }
            Self::InsufficientRemaining { needed, remaining } => write!(
                f,
                "Insufficient remaining budget: need {}, have {}",
                needed, remaining
            ),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
