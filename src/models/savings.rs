//! Savings snapshots
//!
//! A point-in-time capture of an allocation's unused budget, with a
//! line-item breakdown from the department's approved PRE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::fiscal_year::FiscalYear;
use super::ids::{AllocationId, SnapshotId};
use super::money::Money;
use super::pre::Section;
use super::quarter::{Quarter, QuarterAmounts};

/// Line-item surpluses above this amount are flagged as significant
pub const SIGNIFICANT_SURPLUS: Money = Money::from_centavos(500_000); // ₱5,000

/// Per-line-item savings detail captured at snapshot time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSavings {
    pub section: Section,

    #[serde(default)]
    pub subcategory: String,

    pub name: String,

    /// Quarterly allocated amounts at snapshot time
    pub allocated: QuarterAmounts,

    /// Quarterly amounts consumed by approved PRs and ADs
    pub consumed: QuarterAmounts,
}

impl LineSavings {
    /// Surplus for one quarter
    pub fn surplus(&self, quarter: Quarter) -> Money {
        self.allocated.get(quarter) - self.consumed.get(quarter)
    }

    /// Total surplus across all quarters
    pub fn total_surplus(&self) -> Money {
        self.allocated.total() - self.consumed.total()
    }

    /// Whether the surplus crosses the significance threshold
    pub fn is_significant(&self) -> bool {
        self.total_surplus() > SIGNIFICANT_SURPLUS
    }

    /// Utilization percentage across all quarters
    pub fn utilization_rate(&self) -> f64 {
        self.consumed.total().percent_of(self.allocated.total())
    }
}

/// A snapshot of an allocation's savings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsSnapshot {
    pub id: SnapshotId,
    pub allocation_id: AllocationId,
    pub fiscal_year: FiscalYear,
    pub department: String,

    pub allocated: Money,
    pub pr_used: Money,
    pub ad_used: Money,
    pub total_used: Money,
    pub savings: Money,

    /// "Q1".."Q4" or "Full Year"
    #[serde(default)]
    pub quarter_label: String,

    #[serde(default)]
    pub lines: Vec<LineSavings>,

    #[serde(default)]
    pub notes: String,

    pub created_by: String,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub archive: ArchiveState,
}

impl SavingsSnapshot {
    /// Capture a snapshot from current allocation figures
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        allocation_id: AllocationId,
        fiscal_year: FiscalYear,
        department: impl Into<String>,
        allocated: Money,
        pr_used: Money,
        ad_used: Money,
        quarter_label: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let total_used = pr_used + ad_used;
        Self {
            id: SnapshotId::new(),
            allocation_id,
            fiscal_year,
            department: department.into(),
            allocated,
            pr_used,
            ad_used,
            total_used,
            savings: allocated - total_used,
            quarter_label: quarter_label.into(),
            lines: Vec::new(),
            notes: String::new(),
            created_by: created_by.into(),
            created_at: Utc::now(),
            archive: ArchiveState::active(),
        }
    }

    /// Budget utilization percentage
    pub fn utilization_rate(&self) -> f64 {
        self.total_used.percent_of(self.allocated)
    }

    /// Savings percentage
    pub fn savings_rate(&self) -> f64 {
        self.savings.percent_of(self.allocated)
    }

    /// Lines with significant surplus, largest first
    pub fn significant_lines(&self) -> Vec<&LineSavings> {
        let mut lines: Vec<&LineSavings> =
            self.lines.iter().filter(|l| l.is_significant()).collect();
        lines.sort_by_key(|l| std::cmp::Reverse(l.total_surplus()));
        lines
    }
}

impl fmt::Display for SavingsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - Savings: {}",
            self.department, self.fiscal_year, self.savings
        )
    }
}
