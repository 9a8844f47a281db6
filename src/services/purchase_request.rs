//! Purchase request service
//!
//! Lifecycle of a procurement document: drafting with item rows, funding from
//! approved PRE line items, submission, review, and final approval with fund
//! deduction.

use tracing::info;

use crate::audit::{EntityType, Operation};
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{
    AllocationId, Funding, LedgerKind, LineItemId, Money, PreId, PurchaseItem, PurchaseRequest,
    PurchaseRequestId, Quarter, RequestStatus,
};
use crate::services::funding::{self, DocumentRef};
use crate::services::ledger;
use crate::storage::Storage;

/// Service for purchase request management
pub struct PurchaseRequestService<'a> {
    storage: &'a Storage,
}

impl<'a> PurchaseRequestService<'a> {
    /// Create a new purchase request service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a draft purchase request
    pub fn create(
        &self,
        pr_number: &str,
        allocation_id: AllocationId,
        purpose: &str,
        actor: &str,
    ) -> FundwatchResult<PurchaseRequest> {
        if pr_number.trim().is_empty() {
            return Err(FundwatchError::Validation(
                "PR number cannot be empty".into(),
            ));
        }
        if self
            .storage
            .purchase_requests
            .find_by_number(pr_number)?
            .is_some()
        {
            return Err(FundwatchError::Duplicate {
                entity_type: "Purchase request",
                identifier: pr_number.to_string(),
            });
        }

        let allocation = self
            .storage
            .allocations
            .get(allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(allocation_id.to_string()))?;
        if allocation.archive.is_archived() {
            return Err(FundwatchError::Archived(allocation.department));
        }

        let pr = PurchaseRequest::new(pr_number, allocation_id, allocation.department, purpose, actor);

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_create(
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            &pr,
        )?;

        Ok(pr)
    }

    /// Add an item row to a draft
    pub fn add_item(
        &self,
        pr_id: PurchaseRequestId,
        item: PurchaseItem,
        actor: &str,
    ) -> FundwatchResult<PurchaseRequest> {
        let mut pr = self.get(pr_id)?;
        self.ensure_draft(&pr)?;
        if item.quantity == 0 {
            return Err(FundwatchError::Validation(
                "Item quantity must be greater than zero".into(),
            ));
        }
        if !item.unit_cost.is_positive() {
            return Err(FundwatchError::Validation(
                "Item unit cost must be greater than zero".into(),
            ));
        }
        let before = pr.clone();

        pr.push_item(item);

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_update(
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            &before,
            &pr,
        )?;

        Ok(pr)
    }

    /// Fund a draft from an approved PRE line item quarter
    pub fn fund(
        &self,
        pr_id: PurchaseRequestId,
        pre_id: PreId,
        line_item_id: LineItemId,
        quarter: Quarter,
        amount: Money,
        notes: &str,
        actor: &str,
    ) -> FundwatchResult<PurchaseRequest> {
        let mut pr = self.get(pr_id)?;
        self.ensure_draft(&pr)?;

        if !amount.is_positive() {
            return Err(FundwatchError::Validation(
                "Funding amount must be greater than zero".into(),
            ));
        }

        let pre = self
            .storage
            .pres
            .get(pre_id)?
            .ok_or_else(|| FundwatchError::pre_not_found(pre_id.to_string()))?;
        if pre.status != RequestStatus::Approved {
            return Err(FundwatchError::Validation(
                "Funding source must be an approved PRE".into(),
            ));
        }
        if pre.allocation_id != pr.allocation_id {
            return Err(FundwatchError::Validation(
                "Funding PRE belongs to a different allocation".into(),
            ));
        }
        if pre.line_item(line_item_id).is_none() {
            return Err(FundwatchError::line_item_not_found(line_item_id.to_string()));
        }

        let before = pr.clone();
        pr.push_funding(Funding {
            pre_id,
            line_item_id,
            quarter,
            amount,
            notes: notes.to_string(),
        });

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_update(
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            &before,
            &pr,
        )?;

        Ok(pr)
    }

    /// Submit a draft for review
    pub fn submit(&self, pr_id: PurchaseRequestId, actor: &str) -> FundwatchResult<PurchaseRequest> {
        let mut pr = self.get(pr_id)?;
        if pr.archive.is_archived() {
            return Err(FundwatchError::Archived(pr.pr_number));
        }

        self.validate_amounts(&pr, None)?;

        pr.submit()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_action(
            Operation::Submit,
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            None,
        )?;

        Ok(pr)
    }

    /// Partially approve a pending request
    pub fn partial_approve(
        &self,
        pr_id: PurchaseRequestId,
        notes: &str,
        actor: &str,
    ) -> FundwatchResult<PurchaseRequest> {
        let mut pr = self.get(pr_id)?;
        pr.partial_approve(notes)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            Some("partial approval".into()),
        )?;

        Ok(pr)
    }

    /// Record that the signed document came back from the approving officer
    pub fn countersign(
        &self,
        pr_id: PurchaseRequestId,
        actor: &str,
    ) -> FundwatchResult<PurchaseRequest> {
        let mut pr = self.get(pr_id)?;
        pr.countersign()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_action(
            Operation::Update,
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            Some("signed documents received".into()),
        )?;

        Ok(pr)
    }

    /// Final approval: deducts the total from the allocation balance
    pub fn finalize(&self, pr_id: PurchaseRequestId, actor: &str) -> FundwatchResult<PurchaseRequest> {
        let mut pr = self.get(pr_id)?;

        // Re-validate excluding this document's own reservation; budgets may
        // have moved since submission.
        self.validate_amounts(&pr, Some(DocumentRef::Pr(pr.id)))?;

        pr.finalize()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        let total = pr.total_amount();
        let mut allocation = self
            .storage
            .allocations
            .get(pr.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(pr.allocation_id.to_string()))?;

        let previous_balance = allocation.remaining_balance();
        allocation.apply_pr(total);

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.allocations.upsert(allocation.clone())?;

        ledger::record(
            self.storage,
            &allocation,
            LedgerKind::PrApproved,
            -total,
            previous_balance,
            actor,
            pr.pr_number.clone(),
        )?;

        self.storage.purchase_requests.save()?;
        self.storage.allocations.save()?;
        self.storage.ledger.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            Some("final approval".into()),
        )?;

        info!(pr = %pr.pr_number, total = %total, "purchase request approved");
        Ok(pr)
    }

    /// Reject a request under review, releasing its reservation
    pub fn reject(
        &self,
        pr_id: PurchaseRequestId,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<PurchaseRequest> {
        if reason.trim().is_empty() {
            return Err(FundwatchError::Validation(
                "A rejection reason is required".into(),
            ));
        }

        let mut pr = self.get(pr_id)?;
        pr.reject(reason)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.purchase_requests.upsert(pr.clone())?;
        self.storage.purchase_requests.save()?;

        self.storage.log_action(
            Operation::Reject,
            EntityType::PurchaseRequest,
            pr.id.to_string(),
            Some(pr.pr_number.clone()),
            actor,
            Some(reason.to_string()),
        )?;

        Ok(pr)
    }

    /// Get a purchase request by id
    pub fn get(&self, id: PurchaseRequestId) -> FundwatchResult<PurchaseRequest> {
        self.storage
            .purchase_requests
            .get(id)?
            .ok_or_else(|| FundwatchError::purchase_request_not_found(id.to_string()))
    }

    /// Resolve from a document number or id string
    pub fn resolve(&self, reference: &str) -> FundwatchResult<PurchaseRequest> {
        if let Some(pr) = self.storage.purchase_requests.find_by_number(reference)? {
            return Ok(pr);
        }
        if let Ok(id) = reference.parse::<PurchaseRequestId>() {
            if let Some(pr) = self.storage.purchase_requests.get(id)? {
                return Ok(pr);
            }
        }
        Err(FundwatchError::purchase_request_not_found(reference))
    }

    /// List active purchase requests, optionally limited to one allocation
    pub fn list(
        &self,
        allocation_id: Option<AllocationId>,
    ) -> FundwatchResult<Vec<PurchaseRequest>> {
        match allocation_id {
            Some(id) => self.storage.purchase_requests.for_allocation(id),
            None => self.storage.purchase_requests.active(),
        }
    }

    fn ensure_draft(&self, pr: &PurchaseRequest) -> FundwatchResult<()> {
        if pr.status != RequestStatus::Draft {
            return Err(FundwatchError::Workflow(format!(
                "purchase request can only be edited as a draft (status: {})",
                pr.status
            )));
        }
        Ok(())
    }

    /// Shared validation for submission and final approval
    fn validate_amounts(
        &self,
        pr: &PurchaseRequest,
        exclude: Option<DocumentRef>,
    ) -> FundwatchResult<()> {
        let total = pr.total_amount();
        if !total.is_positive() {
            return Err(FundwatchError::Validation(
                "Purchase request total must be greater than zero".into(),
            ));
        }

        if !pr.items.is_empty() && pr.item_total() != pr.funding_total() {
            return Err(FundwatchError::Validation(format!(
                "Item total ({}) does not match funding total ({})",
                pr.item_total(),
                pr.funding_total()
            )));
        }

        // Allocation-level check
        let allocation = self
            .storage
            .allocations
            .get(pr.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(pr.allocation_id.to_string()))?;
        if total > allocation.remaining_balance() {
            return Err(FundwatchError::Budget(format!(
                "PR amount ({}) would exceed the available budget ({})",
                total,
                allocation.remaining_balance()
            )));
        }

        // Quarter-level check against the funding PRE line items
        funding::validate_fundings(self.storage, &pr.fundings, exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::models::pre::Section;
    use crate::models::{FiscalYear, QuarterAmounts};
    use crate::services::{AllocationService, BudgetService, PreService};
    use tempfile::TempDir;

    struct Fixture {
        storage: Storage,
        allocation_id: AllocationId,
        pre_id: PreId,
        line_item_id: LineItemId,
    }

    fn fixture(_temp: &TempDir, allocation_pesos: i64, per_quarter: i64) -> Fixture {
        let paths = FundwatchPaths::with_base_dir(_temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let budget = BudgetService::new(&storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(allocation_pesos * 2),
                "",
                "bursar",
            )
            .unwrap();
        let allocation_id = AllocationService::new(&storage)
            .allocate(budget.id, "Registrar", Money::from_pesos(allocation_pesos), "bursar")
            .unwrap()
            .id;

        let pre_service = PreService::new(&storage);
        let pre = pre_service
            .create_draft(allocation_id, None, None, "head")
            .unwrap();
        let q = Money::from_pesos(per_quarter);
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
        let line_item_id = pre.line_items[0].id;

        Fixture {
            storage,
            allocation_id,
            pre_id: pre.id,
            line_item_id,
        }
    }

    fn item(qty: u32, unit_cost: i64) -> PurchaseItem {
        PurchaseItem {
            stock_no: String::new(),
            unit: "ream".into(),
            description: "Bond paper".into(),
            quantity: qty,
            unit_cost: Money::from_pesos(unit_cost),
        }
    }

    #[test]
    fn test_full_lifecycle_deducts_funds() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 100_000, 10_000);
        let service = PurchaseRequestService::new(&f.storage);

        let pr = service
            .create("PR-2025-0001", f.allocation_id, "supplies", "clerk")
            .unwrap();
        service.add_item(pr.id, item(10, 500), "clerk").unwrap();
        service
            .fund(
                pr.id,
                f.pre_id,
                f.line_item_id,
                Quarter::Q1,
                Money::from_pesos(5_000),
                "",
                "clerk",
            )
            .unwrap();

        service.submit(pr.id, "clerk").unwrap();
        service.partial_approve(pr.id, "ok", "officer").unwrap();
        service.countersign(pr.id, "clerk").unwrap();
        let approved = service.finalize(pr.id, "officer").unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);

        let allocation = f.storage.allocations.get(f.allocation_id).unwrap().unwrap();
        assert_eq!(allocation.pr_used, Money::from_pesos(5_000));
        assert_eq!(allocation.remaining_balance(), Money::from_pesos(95_000));

        // Deduction shows in the ledger chain
        let entries = f.storage.ledger.for_allocation(f.allocation_id).unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.new_balance, Money::from_pesos(95_000));

        // Finalizing again cannot double-deduct
        assert!(service.finalize(pr.id, "officer").is_err());
        let allocation = f.storage.allocations.get(f.allocation_id).unwrap().unwrap();
        assert_eq!(allocation.pr_used, Money::from_pesos(5_000));
    }

    #[test]
    fn test_duplicate_pr_number() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 100_000, 10_000);
        let service = PurchaseRequestService::new(&f.storage);

        service.create("PR-1", f.allocation_id, "a", "clerk").unwrap();
        let err = service.create("pr-1", f.allocation_id, "b", "clerk").unwrap_err();
        assert!(matches!(err, FundwatchError::Duplicate { .. }));
    }

    #[test]
    fn test_submit_requires_matching_totals() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 100_000, 10_000);
        let service = PurchaseRequestService::new(&f.storage);

        let pr = service.create("PR-1", f.allocation_id, "supplies", "clerk").unwrap();
        service.add_item(pr.id, item(10, 500), "clerk").unwrap();
        service
            .fund(
                pr.id,
                f.pre_id,
                f.line_item_id,
                Quarter::Q1,
                Money::from_pesos(4_000),
                "",
                "clerk",
            )
            .unwrap();

        let err = service.submit(pr.id, "clerk").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_submit_requires_funding() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 100_000, 10_000);
        let service = PurchaseRequestService::new(&f.storage);

        let pr = service.create("PR-1", f.allocation_id, "supplies", "clerk").unwrap();
        service.add_item(pr.id, item(1, 100), "clerk").unwrap();

        let err = service.submit(pr.id, "clerk").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_quarterly_limit_enforced() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 1_000_000, 5_000);
        let service = PurchaseRequestService::new(&f.storage);

        // Q1 has 5,000; asking 6,000 from it must fail even though the
        // allocation has plenty
        let pr = service.create("PR-1", f.allocation_id, "supplies", "clerk").unwrap();
        service
            .fund(
                pr.id,
                f.pre_id,
                f.line_item_id,
                Quarter::Q1,
                Money::from_pesos(6_000),
                "",
                "clerk",
            )
            .unwrap();

        let err = service.submit(pr.id, "clerk").unwrap_err();
        assert!(matches!(err, FundwatchError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_reservation_blocks_second_request() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 1_000_000, 5_000);
        let service = PurchaseRequestService::new(&f.storage);

        let first = service.create("PR-1", f.allocation_id, "a", "clerk").unwrap();
        service
            .fund(
                first.id,
                f.pre_id,
                f.line_item_id,
                Quarter::Q2,
                Money::from_pesos(4_000),
                "",
                "clerk",
            )
            .unwrap();
        service.submit(first.id, "clerk").unwrap();

        // Second request wants 2,000 from the same quarter; only 1,000 left
        // after the first's reservation
        let second = service.create("PR-2", f.allocation_id, "b", "clerk").unwrap();
        service
            .fund(
                second.id,
                f.pre_id,
                f.line_item_id,
                Quarter::Q2,
                Money::from_pesos(2_000),
                "",
                "clerk",
            )
            .unwrap();
        let err = service.submit(second.id, "clerk").unwrap_err();
        assert!(matches!(err, FundwatchError::InsufficientFunds { .. }));

        // Rejecting the first releases the reservation
        service.reject(first.id, "not needed", "officer").unwrap();
        service.submit(second.id, "clerk").unwrap();
    }

    #[test]
    fn test_funding_requires_approved_pre_same_allocation() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp, 100_000, 10_000);
        let service = PurchaseRequestService::new(&f.storage);

        // A draft PRE is not an acceptable funding source
        let draft_pre = PreService::new(&f.storage)
            .create_draft(f.allocation_id, None, None, "head")
            .unwrap();

        let pr = service.create("PR-1", f.allocation_id, "a", "clerk").unwrap();
        let err = service
            .fund(
                pr.id,
                draft_pre.id,
                f.line_item_id,
                Quarter::Q1,
                Money::from_pesos(100),
                "",
                "clerk",
            )
            .unwrap_err();
        assert!(err.is_validation());
    }
}
