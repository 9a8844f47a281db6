//! Realignment service
//!
//! Moving budget between PRE line items. Availability checks net out
//! everything already promised from the source quarter: approved and
//! in-review documents plus other pending realignments. The transfer itself
//! executes only at final approval.

use tracing::info;

use crate::audit::{EntityType, Operation};
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{
    LedgerKind, LineItemId, Money, Pre, PreId, Quarter, QuarterAmounts, Realignment, RealignmentId,
    RequestStatus,
};
use crate::services::funding;
use crate::services::ledger;
use crate::storage::Storage;

/// Service for budget realignments
pub struct RealignmentService<'a> {
    storage: &'a Storage,
}

impl<'a> RealignmentService<'a> {
    /// Create a new realignment service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Request a realignment between two PRE line items
    pub fn request(
        &self,
        source_pre_id: PreId,
        source_item_id: LineItemId,
        target_pre_id: PreId,
        target_item_id: LineItemId,
        quarters: QuarterAmounts,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<Realignment> {
        if quarters.is_zero() {
            return Err(FundwatchError::Validation(
                "At least one quarter amount is required".into(),
            ));
        }
        if quarters.any_negative() {
            return Err(FundwatchError::Validation(
                "Quarter amounts cannot be negative".into(),
            ));
        }
        if source_pre_id == target_pre_id && source_item_id == target_item_id {
            return Err(FundwatchError::Validation(
                "Source and target line items must differ".into(),
            ));
        }

        let source_pre = self.approved_pre(source_pre_id)?;
        let target_pre = self.approved_pre(target_pre_id)?;
        let source_item = source_pre
            .line_item(source_item_id)
            .ok_or_else(|| FundwatchError::line_item_not_found(source_item_id.to_string()))?;
        if target_pre.line_item(target_item_id).is_none() {
            return Err(FundwatchError::line_item_not_found(target_item_id.to_string()));
        }

        for (quarter, amount) in quarters.nonzero() {
            let available = self.source_available(
                source_item_id,
                quarter,
                source_item.quarters.get(quarter),
                None,
            )?;
            if amount > available {
                return Err(FundwatchError::InsufficientFunds {
                    line_item: source_item.name.clone(),
                    quarter: quarter.label().to_string(),
                    needed_centavos: amount.centavos(),
                    available_centavos: available.centavos(),
                });
            }
        }

        let realignment = Realignment::new(
            source_pre_id,
            source_item_id,
            target_pre_id,
            target_item_id,
            quarters,
            reason,
            actor,
        );

        self.storage.realignments.upsert(realignment.clone())?;
        self.storage.realignments.save()?;

        self.storage.log_create(
            EntityType::Realignment,
            realignment.id.to_string(),
            Some(source_item.name.clone()),
            actor,
            &realignment,
        )?;

        Ok(realignment)
    }

    /// Partially approve a pending realignment
    pub fn partial_approve(
        &self,
        id: RealignmentId,
        notes: &str,
        actor: &str,
    ) -> FundwatchResult<Realignment> {
        let mut realignment = self.get(id)?;
        realignment
            .partial_approve(notes)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.realignments.upsert(realignment.clone())?;
        self.storage.realignments.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::Realignment,
            realignment.id.to_string(),
            None,
            actor,
            Some("partial approval".into()),
        )?;

        Ok(realignment)
    }

    /// Record that the signed document came back
    pub fn countersign(&self, id: RealignmentId, actor: &str) -> FundwatchResult<Realignment> {
        let mut realignment = self.get(id)?;
        realignment
            .countersign()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.realignments.upsert(realignment.clone())?;
        self.storage.realignments.save()?;

        self.storage.log_action(
            Operation::Update,
            EntityType::Realignment,
            realignment.id.to_string(),
            None,
            actor,
            Some("signed documents received".into()),
        )?;

        Ok(realignment)
    }

    /// Final approval: executes the transfer between line items
    pub fn finalize(&self, id: RealignmentId, actor: &str) -> FundwatchResult<Realignment> {
        let mut realignment = self.get(id)?;

        // Re-check availability excluding this request itself; other documents
        // may have consumed the source since it was filed.
        let source_pre = self.approved_pre(realignment.source_pre)?;
        let source_item = source_pre
            .line_item(realignment.source_line_item)
            .ok_or_else(|| {
                FundwatchError::line_item_not_found(realignment.source_line_item.to_string())
            })?;
        for (quarter, amount) in realignment.quarters.nonzero() {
            let available = self.source_available(
                realignment.source_line_item,
                quarter,
                source_item.quarters.get(quarter),
                Some(realignment.id),
            )?;
            if amount > available {
                return Err(FundwatchError::InsufficientFunds {
                    line_item: source_item.name.clone(),
                    quarter: quarter.label().to_string(),
                    needed_centavos: amount.centavos(),
                    available_centavos: available.centavos(),
                });
            }
        }

        realignment
            .finalize(actor)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.execute_transfer(&realignment)?;

        self.storage.realignments.upsert(realignment.clone())?;
        self.storage.realignments.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::Realignment,
            realignment.id.to_string(),
            None,
            actor,
            Some(format!("executed transfer of {}", realignment.total_amount())),
        )?;

        info!(
            realignment = %realignment.id,
            total = %realignment.total_amount(),
            "realignment executed"
        );
        Ok(realignment)
    }

    /// Reject a realignment under review
    pub fn reject(&self, id: RealignmentId, reason: &str, actor: &str) -> FundwatchResult<Realignment> {
        if reason.trim().is_empty() {
            return Err(FundwatchError::Validation(
                "A rejection reason is required".into(),
            ));
        }

        let mut realignment = self.get(id)?;
        realignment
            .reject(reason)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.realignments.upsert(realignment.clone())?;
        self.storage.realignments.save()?;

        self.storage.log_action(
            Operation::Reject,
            EntityType::Realignment,
            realignment.id.to_string(),
            None,
            actor,
            Some(reason.to_string()),
        )?;

        Ok(realignment)
    }

    /// Get a realignment by id
    pub fn get(&self, id: RealignmentId) -> FundwatchResult<Realignment> {
        self.storage
            .realignments
            .get(id)?
            .ok_or_else(|| FundwatchError::realignment_not_found(id.to_string()))
    }

    /// Resolve a realignment from a full UUID or the short display form
    pub fn resolve(&self, reference: &str) -> FundwatchResult<Realignment> {
        if let Ok(id) = reference.parse::<RealignmentId>() {
            if let Some(realignment) = self.storage.realignments.get(id)? {
                return Ok(realignment);
            }
        }

        let mut matches: Vec<Realignment> = self
            .storage
            .realignments
            .get_all()?
            .into_iter()
            .filter(|r| r.id.to_string() == reference)
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(FundwatchError::realignment_not_found(reference)),
            _ => Err(FundwatchError::Validation(format!(
                "Short id '{}' is ambiguous; use the full id",
                reference
            ))),
        }
    }

    /// List active realignments
    pub fn list(&self) -> FundwatchResult<Vec<Realignment>> {
        self.storage.realignments.active()
    }

    /// Availability of a source quarter: allocated minus consumed, reserved,
    /// and other pending realignment outflows
    fn source_available(
        &self,
        line_item_id: LineItemId,
        quarter: Quarter,
        allocated: Money,
        exclude: Option<RealignmentId>,
    ) -> FundwatchResult<Money> {
        let usage = funding::quarter_usage(self.storage, line_item_id, quarter, allocated, None)?;
        let pending =
            funding::pending_realignment_outflow(self.storage, line_item_id, quarter, exclude)?;
        Ok(usage.available() - pending)
    }

    fn approved_pre(&self, pre_id: PreId) -> FundwatchResult<Pre> {
        let pre = self
            .storage
            .pres
            .get(pre_id)?
            .ok_or_else(|| FundwatchError::pre_not_found(pre_id.to_string()))?;
        if pre.archive.is_archived() {
            return Err(FundwatchError::Archived(pre.department));
        }
        if pre.status != RequestStatus::Approved {
            return Err(FundwatchError::Validation(
                "Realignments operate on approved PREs only".into(),
            ));
        }
        Ok(pre)
    }

    /// Move each quarter amount from the source line item to the target
    fn execute_transfer(&self, realignment: &Realignment) -> FundwatchResult<()> {
        if realignment.source_pre == realignment.target_pre {
            let mut pre = self.approved_pre(realignment.source_pre)?;
            for (quarter, amount) in realignment.quarters.nonzero() {
                pre.line_item_mut(realignment.source_line_item)
                    .ok_or_else(|| {
                        FundwatchError::line_item_not_found(
                            realignment.source_line_item.to_string(),
                        )
                    })?
                    .quarters
                    .subtract(quarter, amount);
                pre.line_item_mut(realignment.target_line_item)
                    .ok_or_else(|| {
                        FundwatchError::line_item_not_found(
                            realignment.target_line_item.to_string(),
                        )
                    })?
                    .quarters
                    .add(quarter, amount);
            }
            pre.recompute_total();
            self.storage.pres.upsert(pre.clone())?;
            self.record_transfer_entry(&pre, realignment)?;
        } else {
            let mut source = self.approved_pre(realignment.source_pre)?;
            let mut target = self.approved_pre(realignment.target_pre)?;
            for (quarter, amount) in realignment.quarters.nonzero() {
                source
                    .line_item_mut(realignment.source_line_item)
                    .ok_or_else(|| {
                        FundwatchError::line_item_not_found(
                            realignment.source_line_item.to_string(),
                        )
                    })?
                    .quarters
                    .subtract(quarter, amount);
                target
                    .line_item_mut(realignment.target_line_item)
                    .ok_or_else(|| {
                        FundwatchError::line_item_not_found(
                            realignment.target_line_item.to_string(),
                        )
                    })?
                    .quarters
                    .add(quarter, amount);
            }
            source.recompute_total();
            target.recompute_total();
            self.storage.pres.upsert(source.clone())?;
            self.storage.pres.upsert(target.clone())?;
            self.record_transfer_entry(&source, realignment)?;
            if source.allocation_id != target.allocation_id {
                self.record_transfer_entry(&target, realignment)?;
            }
        }

        self.storage.pres.save()?;
        self.storage.ledger.save()?;
        Ok(())
    }

    /// Planning-side ledger entry on the affected allocation
    fn record_transfer_entry(&self, pre: &Pre, realignment: &Realignment) -> FundwatchResult<()> {
        let allocation = self
            .storage
            .allocations
            .get(pre.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(pre.allocation_id.to_string()))?;
        let balance = allocation.remaining_balance();
        ledger::record(
            self.storage,
            &allocation,
            LedgerKind::RealignmentApproved,
            realignment.total_amount(),
            balance,
            realignment
                .approved_by
                .as_deref()
                .unwrap_or(&realignment.requested_by),
            format!("realignment {}", realignment.id),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::models::pre::Section;
    use crate::models::{AllocationId, FiscalYear};
    use crate::services::{AllocationService, BudgetService, PreService};
    use tempfile::TempDir;

    struct Fixture {
        storage: Storage,
        pre_id: PreId,
        supplies_id: LineItemId,
        training_id: LineItemId,
    }

    fn fixture(temp: &TempDir) -> Fixture {
        let paths = FundwatchPaths::with_base_dir(temp.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let budget = BudgetService::new(&storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(500_000),
                "",
                "bursar",
            )
            .unwrap();
        let allocation_id: AllocationId = AllocationService::new(&storage)
            .allocate(budget.id, "Registrar", Money::from_pesos(200_000), "bursar")
            .unwrap()
            .id;

        let pre_service = PreService::new(&storage);
        let pre = pre_service
            .create_draft(allocation_id, None, None, "head")
            .unwrap();
        let q = Money::from_pesos(10_000);
        pre_service
            .add_line_item(
                pre.id,
                Section::Mooe,
                "Supplies",
                "Office Supplies Expenses",
                QuarterAmounts::new(q, q, q, q),
                "head",
            )
            .unwrap();
        let pre = pre_service
            .add_line_item(
                pre.id,
                Section::Mooe,
                "Training",
                "Training Expenses",
                QuarterAmounts::new(q, q, q, q),
                "head",
            )
            .unwrap();
        pre_service.submit(pre.id, "head").unwrap();
        pre_service.partial_approve(pre.id, "", "officer").unwrap();
        let pre = pre_service.finalize(pre.id, "officer").unwrap();

        Fixture {
            storage,
            pre_id: pre.id,
            supplies_id: pre.line_items[0].id,
            training_id: pre.line_items[1].id,
        }
    }

    fn q2(pesos: i64) -> QuarterAmounts {
        let mut quarters = QuarterAmounts::zero();
        quarters.set(Quarter::Q2, Money::from_pesos(pesos));
        quarters
    }

    #[test]
    fn test_transfer_moves_quarter_amounts() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp);
        let service = RealignmentService::new(&f.storage);

        let realignment = service
            .request(
                f.pre_id,
                f.supplies_id,
                f.pre_id,
                f.training_id,
                q2(4_000),
                "shift to training",
                "head",
            )
            .unwrap();
        service.partial_approve(realignment.id, "", "officer").unwrap();
        service.finalize(realignment.id, "officer").unwrap();

        let pre = f.storage.pres.get(f.pre_id).unwrap().unwrap();
        let supplies = pre.line_item(f.supplies_id).unwrap();
        let training = pre.line_item(f.training_id).unwrap();
        assert_eq!(supplies.quarters.get(Quarter::Q2), Money::from_pesos(6_000));
        assert_eq!(training.quarters.get(Quarter::Q2), Money::from_pesos(14_000));

        // Grand total is conserved
        assert_eq!(pre.total_amount, Money::from_pesos(80_000));
    }

    #[test]
    fn test_request_rejects_overdraw() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp);
        let service = RealignmentService::new(&f.storage);

        let err = service
            .request(
                f.pre_id,
                f.supplies_id,
                f.pre_id,
                f.training_id,
                q2(12_000),
                "",
                "head",
            )
            .unwrap_err();
        assert!(matches!(err, FundwatchError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_pending_realignments_reduce_availability() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp);
        let service = RealignmentService::new(&f.storage);

        service
            .request(f.pre_id, f.supplies_id, f.pre_id, f.training_id, q2(7_000), "", "head")
            .unwrap();

        // Only 3,000 left in Q2 after the pending request
        let err = service
            .request(f.pre_id, f.supplies_id, f.pre_id, f.training_id, q2(4_000), "", "head")
            .unwrap_err();
        assert!(matches!(err, FundwatchError::InsufficientFunds { .. }));

        service
            .request(f.pre_id, f.supplies_id, f.pre_id, f.training_id, q2(3_000), "", "head")
            .unwrap();
    }

    #[test]
    fn test_same_item_rejected() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp);
        let service = RealignmentService::new(&f.storage);

        let err = service
            .request(f.pre_id, f.supplies_id, f.pre_id, f.supplies_id, q2(100), "", "head")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_zero_quarters_rejected() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp);
        let service = RealignmentService::new(&f.storage);

        let err = service
            .request(
                f.pre_id,
                f.supplies_id,
                f.pre_id,
                f.training_id,
                QuarterAmounts::zero(),
                "",
                "head",
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_finalize_writes_ledger_entry() {
        let temp = TempDir::new().unwrap();
        let f = fixture(&temp);
        let service = RealignmentService::new(&f.storage);

        let realignment = service
            .request(f.pre_id, f.supplies_id, f.pre_id, f.training_id, q2(2_000), "", "head")
            .unwrap();
        service.partial_approve(realignment.id, "", "officer").unwrap();
        service.finalize(realignment.id, "officer").unwrap();

        let pre = f.storage.pres.get(f.pre_id).unwrap().unwrap();
        let entries = f.storage.ledger.for_allocation(pre.allocation_id).unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.kind, LedgerKind::RealignmentApproved);
        assert_eq!(last.previous_balance, last.new_balance);
    }
}
