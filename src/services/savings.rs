//! Savings service
//!
//! Captures point-in-time snapshots of unused budget per allocation, with a
//! per-line-item breakdown from the approved PRE.

use crate::audit::EntityType;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{
    AllocationId, LineSavings, Quarter, QuarterAmounts, SavingsSnapshot, SnapshotId,
};
use crate::services::funding;
use crate::storage::Storage;

/// Service for savings snapshots
pub struct SavingsService<'a> {
    storage: &'a Storage,
}

impl<'a> SavingsService<'a> {
    /// Create a new savings service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Capture a savings snapshot for an allocation
    pub fn snapshot(
        &self,
        allocation_id: AllocationId,
        quarter_label: &str,
        notes: &str,
        actor: &str,
    ) -> FundwatchResult<SavingsSnapshot> {
        let allocation = self
            .storage
            .allocations
            .get(allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(allocation_id.to_string()))?;
        let budget = self
            .storage
            .budgets
            .get(allocation.budget_id)?
            .ok_or_else(|| FundwatchError::budget_not_found(allocation.budget_id.to_string()))?;

        let mut snapshot = SavingsSnapshot::new(
            allocation.id,
            budget.fiscal_year.clone(),
            allocation.department.clone(),
            allocation.allocated,
            allocation.pr_used,
            allocation.ad_used,
            quarter_label,
            actor,
        );
        snapshot.notes = notes.to_string();

        // Line-item breakdown from the approved PRE, consumed = approved
        // documents only
        if let Some(pre) = self.storage.pres.approved_for_allocation(allocation_id)? {
            for item in &pre.line_items {
                let mut consumed = QuarterAmounts::zero();
                for quarter in Quarter::all() {
                    let usage = funding::quarter_usage(
                        self.storage,
                        item.id,
                        quarter,
                        item.quarters.get(quarter),
                        None,
                    )?;
                    consumed.set(quarter, usage.consumed);
                }
                snapshot.lines.push(LineSavings {
                    section: item.section,
                    subcategory: item.subcategory.clone(),
                    name: item.name.clone(),
                    allocated: item.quarters,
                    consumed,
                });
            }
        }

        self.storage.savings.upsert(snapshot.clone())?;
        self.storage.savings.save()?;

        self.storage.log_create(
            EntityType::SavingsSnapshot,
            snapshot.id.to_string(),
            Some(snapshot.department.clone()),
            actor,
            &snapshot,
        )?;

        Ok(snapshot)
    }

    /// Get a snapshot by id
    pub fn get(&self, id: SnapshotId) -> FundwatchResult<SavingsSnapshot> {
        self.storage
            .savings
            .get(id)?
            .ok_or_else(|| FundwatchError::NotFound {
                entity_type: "Savings snapshot",
                identifier: id.to_string(),
            })
    }

    /// Resolve a snapshot from a full UUID or the short display form
    pub fn resolve(&self, reference: &str) -> FundwatchResult<SavingsSnapshot> {
        if let Ok(id) = reference.parse::<SnapshotId>() {
            if let Some(snapshot) = self.storage.savings.get(id)? {
                return Ok(snapshot);
            }
        }

        let mut matches: Vec<SavingsSnapshot> = self
            .storage
            .savings
            .get_all()?
            .into_iter()
            .filter(|s| s.id.to_string() == reference)
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(FundwatchError::NotFound {
                entity_type: "Savings snapshot",
                identifier: reference.to_string(),
            }),
            _ => Err(FundwatchError::Validation(format!(
                "Short id '{}' is ambiguous; use the full id",
                reference
            ))),
        }
    }

    /// List snapshots, optionally limited to one allocation
    pub fn list(&self, allocation_id: Option<AllocationId>) -> FundwatchResult<Vec<SavingsSnapshot>> {
        match allocation_id {
            Some(id) => self.storage.savings.for_allocation(id),
            None => self.storage.savings.get_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::models::pre::Section;
    use crate::models::{FiscalYear, Money};
    use crate::services::{
        AllocationService, BudgetService, PreService, PurchaseRequestService,
    };
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_with_line_breakdown() {
        let temp = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let budget = BudgetService::new(&storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(200_000),
                "",
                "bursar",
            )
            .unwrap();
        let allocation_id = AllocationService::new(&storage)
            .allocate(budget.id, "Registrar", Money::from_pesos(100_000), "bursar")
            .unwrap()
            .id;

        // Approved PRE with a single line item of 10,000 per quarter
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

        // An approved PR consuming 6,000 of Q1
        let pr_service = PurchaseRequestService::new(&storage);
        let pr = pr_service.create("PR-1", allocation_id, "supplies", "clerk").unwrap();
        pr_service
            .fund(
                pr.id,
                pre.id,
                pre.line_items[0].id,
                Quarter::Q1,
                Money::from_pesos(6_000),
                "",
                "clerk",
            )
            .unwrap();
        pr_service.submit(pr.id, "clerk").unwrap();
        pr_service.partial_approve(pr.id, "", "officer").unwrap();
        pr_service.finalize(pr.id, "officer").unwrap();

        let snapshot = SavingsService::new(&storage)
            .snapshot(allocation_id, "Full Year", "year-end capture", "bursar")
            .unwrap();

        assert_eq!(snapshot.total_used, Money::from_pesos(6_000));
        assert_eq!(snapshot.savings, Money::from_pesos(94_000));
        assert_eq!(snapshot.lines.len(), 1);

        let line = &snapshot.lines[0];
        assert_eq!(line.consumed.get(Quarter::Q1), Money::from_pesos(6_000));
        assert_eq!(line.surplus(Quarter::Q1), Money::from_pesos(4_000));
        assert_eq!(line.total_surplus(), Money::from_pesos(34_000));
        assert!(line.is_significant());
    }

    #[test]
    fn test_snapshot_without_pre_has_no_lines() {
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
        let allocation_id = AllocationService::new(&storage)
            .allocate(budget.id, "Clinic", Money::from_pesos(500), "bursar")
            .unwrap()
            .id;

        let snapshot = SavingsService::new(&storage)
            .snapshot(allocation_id, "Q1", "", "bursar")
            .unwrap();

        assert!(snapshot.lines.is_empty());
        assert_eq!(snapshot.savings, Money::from_pesos(500));
    }
}
