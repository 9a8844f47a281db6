//! Quarterly breakdown report for a PRE
//!
//! Per line item and quarter: allocated, consumed (approved documents),
//! reserved (documents under review), available, and document counts.

use serde::Serialize;

use crate::error::FundwatchResult;
use crate::models::pre::Section;
use crate::models::{Money, PreId, Quarter};
use crate::services::funding;
use crate::storage::Storage;
use crate::error::FundwatchError;

/// One quarter cell of the breakdown
#[derive(Debug, Clone, Serialize)]
pub struct QuarterCell {
    pub quarter: String,
    pub allocated: Money,
    pub consumed: Money,
    pub reserved: Money,
    pub available: Money,
    pub utilization_percent: f64,
    pub pr_count: usize,
    pub ad_count: usize,
}

/// One line item row with its four quarter cells
#[derive(Debug, Clone, Serialize)]
pub struct LineItemBreakdown {
    pub section: Section,
    pub subcategory: String,
    pub name: String,
    pub quarters: Vec<QuarterCell>,
    pub total_allocated: Money,
    pub total_consumed: Money,
    pub total_reserved: Money,
}

impl LineItemBreakdown {
    pub fn total_available(&self) -> Money {
        self.total_allocated - self.total_consumed - self.total_reserved
    }
}

/// The quarterly breakdown report for one PRE
#[derive(Debug, Clone, Serialize)]
pub struct QuarterlyReport {
    pub pre_id: String,
    pub department: String,
    pub fiscal_year: String,
    pub lines: Vec<LineItemBreakdown>,
    pub grand_total: Money,
}

impl QuarterlyReport {
    /// Build the breakdown for a PRE
    pub fn build(storage: &Storage, pre_id: PreId) -> FundwatchResult<Self> {
        let pre = storage
            .pres
            .get(pre_id)?
            .ok_or_else(|| FundwatchError::pre_not_found(pre_id.to_string()))?;

        let mut lines = Vec::new();
        for item in &pre.line_items {
            let mut quarters = Vec::new();
            let mut total_consumed = Money::zero();
            let mut total_reserved = Money::zero();

            for quarter in Quarter::all() {
                let usage = funding::quarter_usage(
                    storage,
                    item.id,
                    quarter,
                    item.quarters.get(quarter),
                    None,
                )?;
                total_consumed += usage.consumed;
                total_reserved += usage.reserved;
                quarters.push(QuarterCell {
                    quarter: quarter.label().to_string(),
                    allocated: usage.allocated,
                    consumed: usage.consumed,
                    reserved: usage.reserved,
                    available: usage.available_clamped(),
                    utilization_percent: usage.utilization_percent(),
                    pr_count: usage.pr_count,
                    ad_count: usage.ad_count,
                });
            }

            lines.push(LineItemBreakdown {
                section: item.section,
                subcategory: item.subcategory.clone(),
                name: item.name.clone(),
                quarters,
                total_allocated: item.quarters.total(),
                total_consumed,
                total_reserved,
            });
        }

        Ok(Self {
            pre_id: pre.id.to_string(),
            department: pre.department.clone(),
            fiscal_year: pre.fiscal_year.to_string(),
            grand_total: pre.total_amount,
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::models::{FiscalYear, QuarterAmounts};
    use crate::services::{
        AllocationService, BudgetService, PreService, PurchaseRequestService,
    };
    use tempfile::TempDir;

    #[test]
    fn test_breakdown_reflects_consumption_and_reservation() {
        let temp = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let budget = BudgetService::new(&storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(400_000),
                "",
                "bursar",
            )
            .unwrap();
        let allocation_id = AllocationService::new(&storage)
            .allocate(budget.id, "Registrar", Money::from_pesos(200_000), "bursar")
            .unwrap()
            .id;

        let pre_service = PreService::new(&storage);
        let pre = pre_service.create_draft(allocation_id, None, None, "head").unwrap();
        let q = Money::from_pesos(10_000);
        let pre = pre_service
            .add_line_item(
                pre.id,
                Section::Mooe,
                "Supplies",
                "Office Supplies Expenses",
                QuarterAmounts::new(q, q, q, q),
                "head",
            )
            .unwrap();
        pre_service.submit(pre.id, "head").unwrap();
        pre_service.partial_approve(pre.id, "", "officer").unwrap();
        let pre = pre_service.finalize(pre.id, "officer").unwrap();
        let item_id = pre.line_items[0].id;

        // One approved PR on Q1, one pending on Q2
        let pr_service = PurchaseRequestService::new(&storage);
        let approved = pr_service.create("PR-1", allocation_id, "a", "clerk").unwrap();
        pr_service
            .fund(approved.id, pre.id, item_id, Quarter::Q1, Money::from_pesos(4_000), "", "clerk")
            .unwrap();
        pr_service.submit(approved.id, "clerk").unwrap();
        pr_service.partial_approve(approved.id, "", "officer").unwrap();
        pr_service.finalize(approved.id, "officer").unwrap();

        let pending = pr_service.create("PR-2", allocation_id, "b", "clerk").unwrap();
        pr_service
            .fund(pending.id, pre.id, item_id, Quarter::Q2, Money::from_pesos(2_500), "", "clerk")
            .unwrap();
        pr_service.submit(pending.id, "clerk").unwrap();

        let report = QuarterlyReport::build(&storage, pre.id).unwrap();
        assert_eq!(report.lines.len(), 1);

        let line = &report.lines[0];
        assert_eq!(line.total_consumed, Money::from_pesos(4_000));
        assert_eq!(line.total_reserved, Money::from_pesos(2_500));
        assert_eq!(line.total_available(), Money::from_pesos(33_500));

        let q1 = &line.quarters[0];
        assert_eq!(q1.consumed, Money::from_pesos(4_000));
        assert_eq!(q1.available, Money::from_pesos(6_000));
        assert_eq!(q1.pr_count, 1);

        let q2 = &line.quarters[1];
        assert_eq!(q2.reserved, Money::from_pesos(2_500));
        assert_eq!(q2.available, Money::from_pesos(7_500));
        assert!((q2.utilization_percent - 25.0).abs() < 1e-9);
    }
}
