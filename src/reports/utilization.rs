//! Department utilization report
//!
//! Per-allocation figures: allocated, PR/AD usage, remaining, and
//! utilization percentage, sorted by utilization.

use serde::Serialize;

use crate::error::FundwatchResult;
use crate::models::{FiscalYear, Money};
use crate::storage::Storage;

/// One row of the utilization report
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationRow {
    pub department: String,
    pub fiscal_year: String,
    pub allocated: Money,
    pub pr_used: Money,
    pub ad_used: Money,
    pub remaining: Money,
    pub utilization_percent: f64,
}

/// The utilization report
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationReport {
    pub fiscal_year: Option<String>,
    pub rows: Vec<UtilizationRow>,
    pub total_allocated: Money,
    pub total_used: Money,
}

impl UtilizationReport {
    /// Build the report, optionally scoped to one fiscal year, sorted by
    /// utilization descending
    pub fn build(storage: &Storage, fiscal_year: Option<&FiscalYear>) -> FundwatchResult<Self> {
        let budgets = storage.budgets.active()?;
        let mut rows = Vec::new();

        for allocation in storage.allocations.active()? {
            let Some(budget) = budgets.iter().find(|b| b.id == allocation.budget_id) else {
                continue;
            };
            if let Some(fy) = fiscal_year {
                if &budget.fiscal_year != fy {
                    continue;
                }
            }
            rows.push(UtilizationRow {
                department: allocation.department.clone(),
                fiscal_year: budget.fiscal_year.to_string(),
                allocated: allocation.allocated,
                pr_used: allocation.pr_used,
                ad_used: allocation.ad_used,
                remaining: allocation.remaining_balance(),
                utilization_percent: allocation.utilization_percent(),
            });
        }

        rows.sort_by(|a, b| {
            b.utilization_percent
                .partial_cmp(&a.utilization_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(Self {
            fiscal_year: fiscal_year.map(|fy| fy.to_string()),
            total_allocated: rows.iter().map(|r| r.allocated).sum(),
            total_used: rows.iter().map(|r| r.pr_used + r.ad_used).sum(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::services::{AllocationService, BudgetService};
    use tempfile::TempDir;

    #[test]
    fn test_rows_sorted_by_utilization() {
        let temp = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let budget = BudgetService::new(&storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(1_000),
                "",
                "bursar",
            )
            .unwrap();

        let service = AllocationService::new(&storage);
        let low = service
            .allocate(budget.id, "Library", Money::from_pesos(400), "bursar")
            .unwrap();
        let high = service
            .allocate(budget.id, "Clinic", Money::from_pesos(400), "bursar")
            .unwrap();

        let mut low = low;
        low.apply_pr(Money::from_pesos(40));
        storage.allocations.upsert(low).unwrap();

        let mut high = high;
        high.apply_ad(Money::from_pesos(300));
        storage.allocations.upsert(high).unwrap();

        let report = UtilizationReport::build(&storage, None).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].department, "Clinic");
        assert_eq!(report.total_allocated, Money::from_pesos(800));
        assert_eq!(report.total_used, Money::from_pesos(340));
    }
}
