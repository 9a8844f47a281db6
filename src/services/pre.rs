//! PRE service
//!
//! Lifecycle of a department's Program of Receipts and Expenditures: drafting
//! (by sheet import or manual entry), submission, review, and final approval,
//! which records the plan total against the allocation.

use tracing::{info, warn};

use crate::audit::{EntityType, Operation};
use crate::error::{FundwatchError, FundwatchResult};
use crate::import::pre_sheet::ParsedPreSheet;
use crate::models::pre::{LineItem, LineItemSource, Receipt, Section};
use crate::models::{AllocationId, LedgerKind, Pre, PreId, QuarterAmounts, RequestStatus};
use crate::services::ledger;
use crate::storage::Storage;

/// Service for PRE management
pub struct PreService<'a> {
    storage: &'a Storage,
}

impl<'a> PreService<'a> {
    /// Create a new PRE service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an empty draft PRE for an allocation
    pub fn create_draft(
        &self,
        allocation_id: AllocationId,
        program: Option<String>,
        fund_source: Option<String>,
        actor: &str,
    ) -> FundwatchResult<Pre> {
        let (department, fiscal_year) = self.allocation_context(allocation_id)?;

        let mut pre = Pre::new(allocation_id, department, fiscal_year, actor);
        pre.program = program;
        pre.fund_source = fund_source;

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_create(
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            &pre,
        )?;

        Ok(pre)
    }

    /// Create a draft PRE from a parsed sheet
    ///
    /// The sheet's fiscal year, when present, wins over the allocation's;
    /// a mismatch is the department uploading last year's template.
    pub fn import_sheet(
        &self,
        allocation_id: AllocationId,
        parsed: &ParsedPreSheet,
        actor: &str,
    ) -> FundwatchResult<Pre> {
        let (department, fiscal_year) = self.allocation_context(allocation_id)?;
        let fiscal_year = parsed.fiscal_year.clone().unwrap_or(fiscal_year);

        let mut pre = Pre::new(allocation_id, department, fiscal_year, actor);

        for receipt in &parsed.receipts {
            pre.receipts.push(Receipt {
                receipt_type: receipt.name.clone(),
                quarters: receipt.quarters,
            });
        }

        for parsed_item in &parsed.line_items {
            let mut item = LineItem::new(parsed_item.section, &parsed_item.name, parsed_item.quarters);
            item.subcategory = parsed_item.subcategory.clone();
            item.source = if parsed_item.is_custom {
                LineItemSource::Manual
            } else {
                LineItemSource::Template
            };
            pre.line_items.push(item);
        }
        pre.recompute_total();

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_create(
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            &pre,
        )?;

        info!(
            pre = %pre.id,
            items = pre.line_items.len(),
            total = %pre.total_amount,
            "PRE imported from sheet"
        );
        Ok(pre)
    }

    /// Add a line item to a draft PRE
    pub fn add_line_item(
        &self,
        pre_id: PreId,
        section: Section,
        subcategory: &str,
        name: &str,
        quarters: QuarterAmounts,
        actor: &str,
    ) -> FundwatchResult<Pre> {
        let mut pre = self.get(pre_id)?;
        if pre.status != RequestStatus::Draft {
            return Err(FundwatchError::Workflow(format!(
                "line items can only be added while the PRE is a draft (status: {})",
                pre.status
            )));
        }
        if quarters.any_negative() {
            return Err(FundwatchError::Validation(
                "Quarter amounts cannot be negative".into(),
            ));
        }
        let before = pre.clone();

        let mut item = LineItem::new(section, name, quarters);
        item.subcategory = subcategory.to_string();
        item.source = LineItemSource::Manual;
        pre.push_line_item(item);

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_update(
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            &before,
            &pre,
        )?;

        Ok(pre)
    }

    /// Submit a draft PRE for review
    pub fn submit(&self, pre_id: PreId, actor: &str) -> FundwatchResult<Pre> {
        let mut pre = self.get(pre_id)?;
        if pre.archive.is_archived() {
            return Err(FundwatchError::Archived(pre.department));
        }

        if pre.line_items.is_empty() {
            return Err(FundwatchError::Validation(
                "PRE has no expenditure line items".into(),
            ));
        }

        let total = pre.recompute_total();
        if !total.is_positive() {
            return Err(FundwatchError::Validation(
                "PRE total amount must be greater than zero".into(),
            ));
        }

        let allocation = self
            .storage
            .allocations
            .get(pre.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(pre.allocation_id.to_string()))?;
        if allocation.archive.is_archived() {
            return Err(FundwatchError::Archived(allocation.department));
        }
        if total > allocation.remaining_balance() {
            return Err(FundwatchError::Budget(format!(
                "PRE total ({}) exceeds the remaining allocation balance ({})",
                total,
                allocation.remaining_balance()
            )));
        }

        pre.submit()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_action(
            Operation::Submit,
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            None,
        )?;

        Ok(pre)
    }

    /// Partially approve a pending PRE
    pub fn partial_approve(&self, pre_id: PreId, notes: &str, actor: &str) -> FundwatchResult<Pre> {
        let mut pre = self.get(pre_id)?;
        pre.partial_approve(notes)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            Some("partial approval".into()),
        )?;

        Ok(pre)
    }

    /// Record that the signed document came back from the approving officer
    pub fn countersign(&self, pre_id: PreId, actor: &str) -> FundwatchResult<Pre> {
        let mut pre = self.get(pre_id)?;
        pre.countersign()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_action(
            Operation::Update,
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            Some("signed documents received".into()),
        )?;

        Ok(pre)
    }

    /// Final approval: records the PRE grand total against the allocation
    ///
    /// Only one approved PRE may exist per allocation. The transition guard
    /// means an already-approved PRE cannot deduct twice.
    pub fn finalize(&self, pre_id: PreId, actor: &str) -> FundwatchResult<Pre> {
        let mut pre = self.get(pre_id)?;

        if let Some(existing) = self.storage.pres.approved_for_allocation(pre.allocation_id)? {
            if existing.id != pre.id {
                return Err(FundwatchError::Validation(format!(
                    "Allocation already has an approved PRE ({})",
                    existing.id
                )));
            }
        }

        let stored_total = pre.total_amount;
        let total = pre.recompute_total();
        if stored_total != total {
            warn!(
                pre = %pre.id,
                stored = %stored_total,
                computed = %total,
                "PRE total drifted from line items; corrected"
            );
        }

        pre.finalize()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        let mut allocation = self
            .storage
            .allocations
            .get(pre.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(pre.allocation_id.to_string()))?;

        let previous_balance = allocation.remaining_balance();
        allocation.apply_pre(total);

        self.storage.pres.upsert(pre.clone())?;
        self.storage.allocations.upsert(allocation.clone())?;

        ledger::record(
            self.storage,
            &allocation,
            LedgerKind::PreApproved,
            total,
            previous_balance,
            actor,
            format!("PRE {} grand total recorded", pre.id),
        )?;

        self.storage.pres.save()?;
        self.storage.allocations.save()?;
        self.storage.ledger.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            Some("final approval".into()),
        )?;

        info!(pre = %pre.id, total = %total, "PRE approved");
        Ok(pre)
    }

    /// Reject a PRE under review
    pub fn reject(&self, pre_id: PreId, reason: &str, actor: &str) -> FundwatchResult<Pre> {
        if reason.trim().is_empty() {
            return Err(FundwatchError::Validation(
                "A rejection reason is required".into(),
            ));
        }

        let mut pre = self.get(pre_id)?;
        pre.reject(reason)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.pres.upsert(pre.clone())?;
        self.storage.pres.save()?;

        self.storage.log_action(
            Operation::Reject,
            EntityType::Pre,
            pre.id.to_string(),
            Some(pre.department.clone()),
            actor,
            Some(reason.to_string()),
        )?;

        Ok(pre)
    }

    /// Get a PRE by id
    pub fn get(&self, id: PreId) -> FundwatchResult<Pre> {
        self.storage
            .pres
            .get(id)?
            .ok_or_else(|| FundwatchError::pre_not_found(id.to_string()))
    }

    /// Resolve a PRE from a full UUID or the short display form ("pre-1a2b3c4d")
    pub fn resolve(&self, reference: &str) -> FundwatchResult<Pre> {
        if let Ok(id) = reference.parse::<PreId>() {
            if let Some(pre) = self.storage.pres.get(id)? {
                return Ok(pre);
            }
        }

        let mut matches: Vec<Pre> = self
            .storage
            .pres
            .get_all()?
            .into_iter()
            .filter(|p| p.id.to_string() == reference)
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(FundwatchError::pre_not_found(reference)),
            _ => Err(FundwatchError::Validation(format!(
                "Short id '{}' is ambiguous; use the full id",
                reference
            ))),
        }
    }

    /// List active PREs, optionally limited to one allocation
    pub fn list(&self, allocation_id: Option<AllocationId>) -> FundwatchResult<Vec<Pre>> {
        match allocation_id {
            Some(id) => self.storage.pres.for_allocation(id),
            None => self.storage.pres.active(),
        }
    }

    fn allocation_context(
        &self,
        allocation_id: AllocationId,
    ) -> FundwatchResult<(String, crate::models::FiscalYear)> {
        let allocation = self
            .storage
            .allocations
            .get(allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(allocation_id.to_string()))?;
        if allocation.archive.is_archived() {
            return Err(FundwatchError::Archived(allocation.department));
        }
        let budget = self
            .storage
            .budgets
            .get(allocation.budget_id)?
            .ok_or_else(|| FundwatchError::budget_not_found(allocation.budget_id.to_string()))?;
        Ok((allocation.department, budget.fiscal_year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::models::{FiscalYear, Money};
    use crate::services::{AllocationService, BudgetService};
    use tempfile::TempDir;

    fn storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seeded_allocation(storage: &Storage, pesos: i64) -> AllocationId {
        let budget = BudgetService::new(storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(pesos * 2),
                "",
                "bursar",
            )
            .unwrap();
        AllocationService::new(storage)
            .allocate(budget.id, "Registrar", Money::from_pesos(pesos), "bursar")
            .unwrap()
            .id
    }

    fn quarters(pesos_per_quarter: i64) -> QuarterAmounts {
        let q = Money::from_pesos(pesos_per_quarter);
        QuarterAmounts::new(q, q, q, q)
    }

    fn drafted_pre(storage: &Storage, allocation_id: AllocationId, per_quarter: i64) -> Pre {
        let service = PreService::new(storage);
        let pre = service
            .create_draft(allocation_id, Some("General Fund".into()), None, "head")
            .unwrap();
        service
            .add_line_item(
                pre.id,
                Section::Mooe,
                "Supplies",
                "Office Supplies Expenses",
                quarters(per_quarter),
                "head",
            )
            .unwrap()
    }

    #[test]
    fn test_draft_inherits_department_and_year() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let pre = PreService::new(&storage)
            .create_draft(allocation_id, None, None, "head")
            .unwrap();

        assert_eq!(pre.department, "Registrar");
        assert_eq!(pre.fiscal_year.as_str(), "2025");
        assert_eq!(pre.status, RequestStatus::Draft);
    }

    #[test]
    fn test_add_line_item_only_on_draft() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let service = PreService::new(&storage);
        let pre = drafted_pre(&storage, allocation_id, 1000);

        let submitted = service.submit(pre.id, "head").unwrap();
        let err = service
            .add_line_item(
                submitted.id,
                Section::Capital,
                "",
                "Equipment",
                quarters(10),
                "head",
            )
            .unwrap_err();
        assert!(err.is_workflow());
    }

    #[test]
    fn test_submit_validates_against_allocation() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 1_000);
        let service = PreService::new(&storage);

        // 4 quarters x 1000 = 4000 > 1000 allocation
        let pre = drafted_pre(&storage, allocation_id, 1000);
        let err = service.submit(pre.id, "head").unwrap_err();
        assert!(matches!(err, FundwatchError::Budget(_)));
    }

    #[test]
    fn test_submit_requires_line_items() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let service = PreService::new(&storage);

        let empty = service.create_draft(allocation_id, None, None, "head").unwrap();
        let err = service.submit(empty.id, "head").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_full_workflow_records_against_allocation() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let service = PreService::new(&storage);
        let pre = drafted_pre(&storage, allocation_id, 1000);

        service.submit(pre.id, "head").unwrap();
        service.partial_approve(pre.id, "for signing", "officer").unwrap();
        service.countersign(pre.id, "head").unwrap();
        let approved = service.finalize(pre.id, "officer").unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);

        let allocation = storage.allocations.get(allocation_id).unwrap().unwrap();
        assert_eq!(allocation.pre_used, Money::from_pesos(4000));
        // PRE does not consume the spendable balance
        assert_eq!(allocation.remaining_balance(), Money::from_pesos(100_000));

        // Planning ledger entry with flat balance
        let entries = storage.ledger.for_allocation(allocation_id).unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.previous_balance, last.new_balance);

        // Second finalize cannot double-record
        assert!(service.finalize(pre.id, "officer").is_err());
    }

    #[test]
    fn test_single_approved_pre_per_allocation() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let service = PreService::new(&storage);

        let first = drafted_pre(&storage, allocation_id, 1000);
        service.submit(first.id, "head").unwrap();
        service.partial_approve(first.id, "", "officer").unwrap();
        service.finalize(first.id, "officer").unwrap();

        let second = drafted_pre(&storage, allocation_id, 500);
        service.submit(second.id, "head").unwrap();
        service.partial_approve(second.id, "", "officer").unwrap();
        let err = service.finalize(second.id, "officer").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_resolve_short_and_full_id() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let service = PreService::new(&storage);
        let pre = drafted_pre(&storage, allocation_id, 1000);

        // Full UUID form
        let by_uuid = service.resolve(&pre.id.as_uuid().to_string()).unwrap();
        assert_eq!(by_uuid.id, pre.id);

        // Short display form ("pre-1a2b3c4d")
        let by_short = service.resolve(&pre.id.to_string()).unwrap();
        assert_eq!(by_short.id, pre.id);

        assert!(service.resolve("pre-00000000").is_err());
    }

    #[test]
    fn test_reject_requires_reason() {
        let (_t, storage) = storage();
        let allocation_id = seeded_allocation(&storage, 100_000);
        let service = PreService::new(&storage);
        let pre = drafted_pre(&storage, allocation_id, 1000);
        service.submit(pre.id, "head").unwrap();

        assert!(service.reject(pre.id, "  ", "officer").is_err());
        let rejected = service.reject(pre.id, "wrong template", "officer").unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
    }
}
