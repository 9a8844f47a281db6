//! Archive service
//!
//! Cascade archiving of fiscal-year budgets and everything hanging off them,
//! with provenance-aware restore: records archived manually survive a
//! fiscal-year cascade restore.

use std::collections::HashSet;

use tracing::info;

use crate::audit::{EntityType, Operation};
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{AllocationId, ArchiveType, BudgetId, PreId};
use crate::storage::Storage;

/// Service for archive and restore operations
pub struct ArchiveService<'a> {
    storage: &'a Storage,
}

/// Outcome of a past-year sweep
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// (title, fiscal year) of each archived budget
    pub archived: Vec<(String, String)>,
}

impl<'a> ArchiveService<'a> {
    /// Create a new archive service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Archive a budget and all its dependent documents
    pub fn archive_budget(
        &self,
        budget_id: BudgetId,
        archive_type: ArchiveType,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<()> {
        let mut budget = self
            .storage
            .budgets
            .get(budget_id)?
            .ok_or_else(|| FundwatchError::budget_not_found(budget_id.to_string()))?;

        budget.archive.archive(archive_type, actor, reason);
        self.storage.budgets.upsert(budget.clone())?;

        let allocation_ids = self.allocation_ids_for_budget(budget_id)?;
        self.archive_below_allocations(&allocation_ids, archive_type, reason, actor)?;

        self.save_cascade()?;

        self.storage.log_action(
            Operation::Archive,
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.title.clone()),
            actor,
            Some(reason.to_string()),
        )?;

        info!(budget = %budget_id, archive_type = %archive_type, "budget archived");
        Ok(())
    }

    /// Restore a budget; children come back only when the cascade archived them
    pub fn restore_budget(&self, budget_id: BudgetId, actor: &str) -> FundwatchResult<()> {
        let mut budget = self
            .storage
            .budgets
            .get(budget_id)?
            .ok_or_else(|| FundwatchError::budget_not_found(budget_id.to_string()))?;

        budget.archive.restore();
        self.storage.budgets.upsert(budget.clone())?;

        let allocation_ids = self.allocation_ids_for_budget(budget_id)?;
        self.restore_below_allocations(&allocation_ids, true)?;

        self.save_cascade()?;

        self.storage.log_action(
            Operation::Restore,
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.title.clone()),
            actor,
            None,
        )?;

        Ok(())
    }

    /// Archive an allocation and its documents (manual action)
    pub fn archive_allocation(
        &self,
        allocation_id: AllocationId,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<()> {
        let mut allocation = self
            .storage
            .allocations
            .get(allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(allocation_id.to_string()))?;

        allocation.archive.archive(ArchiveType::Manual, actor, reason);
        self.storage.allocations.upsert(allocation.clone())?;

        let mut ids = HashSet::new();
        ids.insert(allocation_id);
        self.archive_documents(&ids, ArchiveType::Manual, reason, actor)?;

        self.save_cascade()?;

        self.storage.log_action(
            Operation::Archive,
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(allocation.department.clone()),
            actor,
            Some(reason.to_string()),
        )?;

        Ok(())
    }

    /// Restore an allocation and all of its documents
    ///
    /// An explicit restore of one allocation is taken as intent to force
    /// everything under it back, regardless of archive provenance.
    pub fn restore_allocation(&self, allocation_id: AllocationId, actor: &str) -> FundwatchResult<()> {
        let mut allocation = self
            .storage
            .allocations
            .get(allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(allocation_id.to_string()))?;

        allocation.archive.restore();
        self.storage.allocations.upsert(allocation.clone())?;

        let mut ids = HashSet::new();
        ids.insert(allocation_id);
        self.restore_documents(&ids, false)?;

        self.save_cascade()?;

        self.storage.log_action(
            Operation::Restore,
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(allocation.department.clone()),
            actor,
            None,
        )?;

        Ok(())
    }

    /// Archive every active budget whose fiscal year ended before `current_year`
    pub fn sweep(&self, current_year: i32, actor: &str) -> FundwatchResult<SweepOutcome> {
        let mut outcome = SweepOutcome::default();

        for budget in self.storage.budgets.active()? {
            if budget.fiscal_year.is_past(current_year) {
                self.archive_budget(
                    budget.id,
                    ArchiveType::FiscalYear,
                    "past fiscal year",
                    actor,
                )?;
                outcome
                    .archived
                    .push((budget.title.clone(), budget.fiscal_year.to_string()));
            }
        }

        Ok(outcome)
    }

    fn allocation_ids_for_budget(
        &self,
        budget_id: BudgetId,
    ) -> FundwatchResult<HashSet<AllocationId>> {
        Ok(self
            .storage
            .allocations
            .for_budget(budget_id)?
            .into_iter()
            .map(|a| a.id)
            .collect())
    }

    /// Archive the allocations themselves plus everything beneath them
    fn archive_below_allocations(
        &self,
        allocation_ids: &HashSet<AllocationId>,
        archive_type: ArchiveType,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<()> {
        for mut allocation in self.storage.allocations.get_all()? {
            if allocation_ids.contains(&allocation.id) {
                allocation.archive.archive(archive_type, actor, reason);
                self.storage.allocations.upsert(allocation)?;
            }
        }
        self.archive_documents(allocation_ids, archive_type, reason, actor)
    }

    /// Archive PREs, realignments, PRs, and ADs under the given allocations
    fn archive_documents(
        &self,
        allocation_ids: &HashSet<AllocationId>,
        archive_type: ArchiveType,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<()> {
        let mut pre_ids: HashSet<PreId> = HashSet::new();

        for mut pre in self.storage.pres.get_all()? {
            if allocation_ids.contains(&pre.allocation_id) {
                pre_ids.insert(pre.id);
                pre.archive.archive(archive_type, actor, reason);
                self.storage.pres.upsert(pre)?;
            }
        }

        for mut realignment in self.storage.realignments.get_all()? {
            if pre_ids.contains(&realignment.source_pre) {
                realignment.archive.archive(archive_type, actor, reason);
                self.storage.realignments.upsert(realignment)?;
            }
        }

        for mut pr in self.storage.purchase_requests.get_all()? {
            if allocation_ids.contains(&pr.allocation_id) {
                pr.archive.archive(archive_type, actor, reason);
                self.storage.purchase_requests.upsert(pr)?;
            }
        }

        for mut ad in self.storage.activity_designs.get_all()? {
            if allocation_ids.contains(&ad.allocation_id) {
                ad.archive.archive(archive_type, actor, reason);
                self.storage.activity_designs.upsert(ad)?;
            }
        }

        Ok(())
    }

    /// Restore allocations and documents under them
    ///
    /// With `cascade_only` set, only records the fiscal-year cascade archived
    /// come back; manual archives stay put.
    fn restore_below_allocations(
        &self,
        allocation_ids: &HashSet<AllocationId>,
        cascade_only: bool,
    ) -> FundwatchResult<()> {
        for mut allocation in self.storage.allocations.get_all()? {
            if allocation_ids.contains(&allocation.id)
                && (!cascade_only || allocation.archive.restorable_by_cascade())
            {
                allocation.archive.restore();
                self.storage.allocations.upsert(allocation)?;
            }
        }
        self.restore_documents(allocation_ids, cascade_only)
    }

    fn restore_documents(
        &self,
        allocation_ids: &HashSet<AllocationId>,
        cascade_only: bool,
    ) -> FundwatchResult<()> {
        let restorable = |archive: &crate::models::ArchiveState| {
            if cascade_only {
                archive.restorable_by_cascade()
            } else {
                archive.is_archived()
            }
        };

        let mut pre_ids: HashSet<PreId> = HashSet::new();
        for mut pre in self.storage.pres.get_all()? {
            if allocation_ids.contains(&pre.allocation_id) {
                pre_ids.insert(pre.id);
                if restorable(&pre.archive) {
                    pre.archive.restore();
                    self.storage.pres.upsert(pre)?;
                }
            }
        }

        for mut realignment in self.storage.realignments.get_all()? {
            if pre_ids.contains(&realignment.source_pre) && restorable(&realignment.archive) {
                realignment.archive.restore();
                self.storage.realignments.upsert(realignment)?;
            }
        }

        for mut pr in self.storage.purchase_requests.get_all()? {
            if allocation_ids.contains(&pr.allocation_id) && restorable(&pr.archive) {
                pr.archive.restore();
                self.storage.purchase_requests.upsert(pr)?;
            }
        }

        for mut ad in self.storage.activity_designs.get_all()? {
            if allocation_ids.contains(&ad.allocation_id) && restorable(&ad.archive) {
                ad.archive.restore();
                self.storage.activity_designs.upsert(ad)?;
            }
        }

        Ok(())
    }

    fn save_cascade(&self) -> FundwatchResult<()> {
        self.storage.budgets.save()?;
        self.storage.allocations.save()?;
        self.storage.pres.save()?;
        self.storage.realignments.save()?;
        self.storage.purchase_requests.save()?;
        self.storage.activity_designs.save()?;
        Ok(())
    }
}
