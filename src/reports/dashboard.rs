//! Dashboard report
//!
//! The budget office's overview for a fiscal year: totals, pending and
//! approved document counts, and department-level utilization with
//! low-balance alerts.

use serde::Serialize;

use crate::error::FundwatchResult;
use crate::models::{FiscalYear, Money, RequestStatus};
use crate::storage::Storage;

/// Pending/approved counts per document type
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocCounts {
    pub pres: usize,
    pub purchase_requests: usize,
    pub activity_designs: usize,
}

impl DocCounts {
    pub fn total(&self) -> usize {
        self.pres + self.purchase_requests + self.activity_designs
    }
}

/// One department row on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentRow {
    pub department: String,
    pub allocated: Money,
    pub spent: Money,
    pub remaining: Money,
    pub utilization_percent: f64,
}

/// The dashboard report
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub fiscal_year: Option<String>,
    pub total_budget: Money,
    pub total_remaining: Money,
    pub pending: DocCounts,
    pub approved: DocCounts,
    pub departments: Vec<DepartmentRow>,
    pub low_balance_departments: usize,
    pub average_utilization_percent: f64,
}

impl DashboardReport {
    /// Build the dashboard, optionally scoped to one fiscal year
    ///
    /// `low_balance_threshold_percent` flags departments whose remaining
    /// share drops below it.
    pub fn build(
        storage: &Storage,
        fiscal_year: Option<&FiscalYear>,
        low_balance_threshold_percent: u8,
    ) -> FundwatchResult<Self> {
        let budgets: Vec<_> = storage
            .budgets
            .active()?
            .into_iter()
            .filter(|b| fiscal_year.map_or(true, |fy| &b.fiscal_year == fy))
            .collect();

        let budget_ids: Vec<_> = budgets.iter().map(|b| b.id).collect();
        let allocations: Vec<_> = storage
            .allocations
            .active()?
            .into_iter()
            .filter(|a| budget_ids.contains(&a.budget_id))
            .collect();
        let allocation_ids: Vec<_> = allocations.iter().map(|a| a.id).collect();

        let mut pending = DocCounts::default();
        let mut approved = DocCounts::default();

        for pre in storage.pres.active()? {
            if !allocation_ids.contains(&pre.allocation_id) {
                continue;
            }
            match pre.status {
                RequestStatus::Pending => pending.pres += 1,
                RequestStatus::Approved => approved.pres += 1,
                _ => {}
            }
        }
        for pr in storage.purchase_requests.active()? {
            if !allocation_ids.contains(&pr.allocation_id) {
                continue;
            }
            match pr.status {
                RequestStatus::Pending => pending.purchase_requests += 1,
                RequestStatus::Approved => approved.purchase_requests += 1,
                _ => {}
            }
        }
        for ad in storage.activity_designs.active()? {
            if !allocation_ids.contains(&ad.allocation_id) {
                continue;
            }
            match ad.status {
                RequestStatus::Pending => pending.activity_designs += 1,
                RequestStatus::Approved => approved.activity_designs += 1,
                _ => {}
            }
        }

        let mut departments: Vec<DepartmentRow> = allocations
            .iter()
            .map(|a| DepartmentRow {
                department: a.department.clone(),
                allocated: a.allocated,
                spent: a.total_used(),
                remaining: a.remaining_balance(),
                utilization_percent: a.utilization_percent(),
            })
            .collect();
        departments.sort_by(|a, b| b.allocated.cmp(&a.allocated));

        let low_balance_departments = departments
            .iter()
            .filter(|d| {
                d.allocated.is_positive()
                    && d.remaining.percent_of(d.allocated) < low_balance_threshold_percent as f64
            })
            .count();

        let average_utilization_percent = if departments.is_empty() {
            0.0
        } else {
            departments
                .iter()
                .map(|d| d.utilization_percent)
                .sum::<f64>()
                / departments.len() as f64
        };

        Ok(Self {
            fiscal_year: fiscal_year.map(|fy| fy.to_string()),
            total_budget: budgets.iter().map(|b| b.amount).sum(),
            total_remaining: budgets.iter().map(|b| b.remaining).sum(),
            pending,
            approved,
            departments,
            low_balance_departments,
            average_utilization_percent,
        })
    }
}
