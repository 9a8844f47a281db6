//! Department allocation model
//!
//! A department's share of an approved budget. PRE totals are tracked for
//! planning, but only approved purchase requests and activity designs consume
//! the balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::ids::{AllocationId, BudgetId};
use super::money::Money;

/// A department's allocation from an approved budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// Unique identifier
    pub id: AllocationId,

    /// The budget this allocation was carved from
    pub budget_id: BudgetId,

    /// Department name; unique per budget
    pub department: String,

    /// Amount allocated to the department
    pub allocated: Money,

    /// Total of the department's approved PRE (planning side)
    #[serde(default)]
    pub pre_used: Money,

    /// Amount consumed by approved purchase requests
    #[serde(default)]
    pub pr_used: Money,

    /// Amount consumed by approved activity designs
    #[serde(default)]
    pub ad_used: Money,

    /// When the allocation was made
    pub created_at: DateTime<Utc>,

    /// When the allocation was last modified
    pub updated_at: DateTime<Utc>,

    /// Archive metadata
    #[serde(default)]
    pub archive: ArchiveState,
}

impl Allocation {
    /// Create a new allocation
    pub fn new(budget_id: BudgetId, department: impl Into<String>, allocated: Money) -> Self {
        let now = Utc::now();
        Self {
            id: AllocationId::new(),
            budget_id,
            department: department.into(),
            allocated,
            pre_used: Money::zero(),
            pr_used: Money::zero(),
            ad_used: Money::zero(),
            created_at: now,
            updated_at: now,
            archive: ArchiveState::active(),
        }
    }

    /// Total consumed (PR and AD only; PRE is planning, not spending)
    pub fn total_used(&self) -> Money {
        self.pr_used + self.ad_used
    }

    /// Remaining spendable balance
    ///
    /// Derived rather than stored so it cannot drift from the usage counters.
    pub fn remaining_balance(&self) -> Money {
        self.allocated - self.total_used()
    }

    /// Percentage of the allocation consumed
    pub fn utilization_percent(&self) -> f64 {
        self.total_used().percent_of(self.allocated)
    }

    /// Record an approved purchase request against the balance
    pub fn apply_pr(&mut self, amount: Money) {
        self.pr_used += amount;
        self.updated_at = Utc::now();
    }

    /// Record an approved activity design against the balance
    pub fn apply_ad(&mut self, amount: Money) {
        self.ad_used += amount;
        self.updated_at = Utc::now();
    }

    /// Record an approved PRE total (planning side)
    pub fn apply_pre(&mut self, amount: Money) {
        self.pre_used += amount;
        self.updated_at = Utc::now();
    }

    /// Grow or shrink the allocated amount
    pub fn adjust(&mut self, delta: Money) -> Result<(), AllocationValidationError> {
        let new_allocated = self.allocated + delta;
        if new_allocated < self.total_used() {
            return Err(AllocationValidationError::BelowUsage {
                requested: new_allocated,
                used: self.total_used(),
            });
        }
        self.allocated = new_allocated;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate the allocation
    pub fn validate(&self) -> Result<(), AllocationValidationError> {
        if self.department.trim().is_empty() {
            return Err(AllocationValidationError::EmptyDepartment);
        }
        if !self.allocated.is_positive() {
            return Err(AllocationValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} allocated, {} remaining)",
            self.department,
            self.allocated,
            self.remaining_balance()
        )
    }
}

/// Validation errors for allocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationValidationError {
    EmptyDepartment,
    NonPositiveAmount,
    BelowUsage { requested: Money, used: Money },
}

impl fmt::Display for AllocationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDepartment => write!(f, "Department name cannot be empty"),
            Self::NonPositiveAmount => {
                write!(f, "Allocated amount must be greater than zero")
            }
            Self::BelowUsage { requested, used } => write!(
                f,
                "Allocation of {} would fall below the {} already consumed",
                requested, used
            ),
        }
    }
}

impl std::error::Error for AllocationValidationError {}
