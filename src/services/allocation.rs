//! Allocation service
//!
//! Carves department allocations out of an approved budget and adjusts them,
//! writing a ledger entry for every balance event.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{Allocation, AllocationId, BudgetId, LedgerKind, Money};
use crate::services::ledger;
use crate::storage::Storage;

/// Service for department allocations
pub struct AllocationService<'a> {
    storage: &'a Storage,
}

impl<'a> AllocationService<'a> {
    /// Create a new allocation service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Carve an allocation for a department out of a budget
    pub fn allocate(
        &self,
        budget_id: BudgetId,
        department: &str,
        amount: Money,
        actor: &str,
    ) -> FundwatchResult<Allocation> {
        let mut budget = self
            .storage
            .budgets
            .get(budget_id)?
            .ok_or_else(|| FundwatchError::budget_not_found(budget_id.to_string()))?;

        if budget.archive.is_archived() {
            return Err(FundwatchError::Archived(budget.title));
        }

        if self
            .storage
            .allocations
            .find_department(budget_id, department)?
            .is_some()
        {
            return Err(FundwatchError::Duplicate {
                entity_type: "Allocation",
                identifier: department.to_string(),
            });
        }

        let allocation = Allocation::new(budget_id, department, amount);
        allocation
            .validate()
            .map_err(|e| FundwatchError::Validation(e.to_string()))?;

        budget
            .carve(amount)
            .map_err(|e| FundwatchError::Budget(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.allocations.upsert(allocation.clone())?;

        ledger::record(
            self.storage,
            &allocation,
            LedgerKind::AllocationCreated,
            amount,
            Money::zero(),
            actor,
            format!("initial allocation for {}", allocation.department),
        )?;

        self.storage.budgets.save()?;
        self.storage.allocations.save()?;
        self.storage.ledger.save()?;

        self.storage.log_create(
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(allocation.department.clone()),
            actor,
            &allocation,
        )?;

        info!(
            allocation = %allocation.id,
            department = %allocation.department,
            amount = %amount,
            "allocation carved"
        );
        Ok(allocation)
    }

    /// Adjust an allocation up or down, moving the difference to/from the
    /// budget's remaining balance
    pub fn adjust(
        &self,
        allocation_id: AllocationId,
        delta: Money,
        remarks: &str,
        actor: &str,
    ) -> FundwatchResult<Allocation> {
        if delta.is_zero() {
            return Err(FundwatchError::Validation(
                "Adjustment amount must be non-zero".into(),
            ));
        }

        let mut allocation = self.get(allocation_id)?;
        if allocation.archive.is_archived() {
            return Err(FundwatchError::Archived(allocation.department));
        }
        let before = allocation.clone();

        let mut budget = self
            .storage
            .budgets
            .get(allocation.budget_id)?
            .ok_or_else(|| FundwatchError::budget_not_found(allocation.budget_id.to_string()))?;

        if delta.is_positive() {
            budget
                .carve(delta)
                .map_err(|e| FundwatchError::Budget(e.to_string()))?;
        } else {
            budget.release(-delta);
        }

        let previous_balance = allocation.remaining_balance();
        allocation
            .adjust(delta)
            .map_err(|e| FundwatchError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget)?;
        self.storage.allocations.upsert(allocation.clone())?;

        ledger::record(
            self.storage,
            &allocation,
            LedgerKind::AllocationModified,
            delta,
            previous_balance,
            actor,
            remarks,
        )?;

        self.storage.budgets.save()?;
        self.storage.allocations.save()?;
        self.storage.ledger.save()?;

        self.storage.log_update(
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(allocation.department.clone()),
            actor,
            &before,
            &allocation,
        )?;

        Ok(allocation)
    }

    /// Get an allocation by id
    pub fn get(&self, id: AllocationId) -> FundwatchResult<Allocation> {
        self.storage
            .allocations
            .get(id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(id.to_string()))
    }

    /// Resolve an allocation from an id string, or a budget + department pair
    pub fn resolve(
        &self,
        reference: &str,
        budget_id: Option<BudgetId>,
    ) -> FundwatchResult<Allocation> {
        if let Ok(id) = reference.parse::<AllocationId>() {
            if let Some(allocation) = self.storage.allocations.get(id)? {
                return Ok(allocation);
            }
        }
        if let Some(budget_id) = budget_id {
            if let Some(allocation) = self
                .storage
                .allocations
                .find_department(budget_id, reference)?
            {
                return Ok(allocation);
            }
        }
        Err(FundwatchError::allocation_not_found(reference))
    }

    /// List active allocations, optionally limited to one budget
    pub fn list(&self, budget_id: Option<BudgetId>) -> FundwatchResult<Vec<Allocation>> {
        let allocations = self.storage.allocations.active()?;
        Ok(allocations
            .into_iter()
            .filter(|a| budget_id.map_or(true, |id| a.budget_id == id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FundwatchPaths;
    use crate::models::FiscalYear;
    use crate::services::BudgetService;
    use tempfile::TempDir;

    fn storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seeded_budget(storage: &Storage) -> BudgetId {
        BudgetService::new(storage)
            .create_budget(
                "Budget",
                FiscalYear::parse("2025").unwrap(),
                Money::from_pesos(1_000_000),
                "",
                "bursar",
            )
            .unwrap()
            .id
    }

    #[test]
    fn test_allocate_deducts_budget() {
        let (_t, storage) = storage();
        let budget_id = seeded_budget(&storage);
        let service = AllocationService::new(&storage);

        let allocation = service
            .allocate(budget_id, "Registrar", Money::from_pesos(300_000), "bursar")
            .unwrap();

        assert_eq!(allocation.remaining_balance(), Money::from_pesos(300_000));
        let budget = storage.budgets.get(budget_id).unwrap().unwrap();
        assert_eq!(budget.remaining, Money::from_pesos(700_000));

        // Ledger entry written
        let entries = storage.ledger.for_allocation(allocation.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].new_balance, Money::from_pesos(300_000));
    }

    #[test]
    fn test_allocate_exceeding_budget_fails() {
        let (_t, storage) = storage();
        let budget_id = seeded_budget(&storage);
        let service = AllocationService::new(&storage);

        let err = service
            .allocate(budget_id, "Registrar", Money::from_pesos(2_000_000), "bursar")
            .unwrap_err();
        assert!(matches!(err, FundwatchError::Budget(_)));

        // Budget untouched
        let budget = storage.budgets.get(budget_id).unwrap().unwrap();
        assert_eq!(budget.remaining, Money::from_pesos(1_000_000));
    }

    #[test]
    fn test_duplicate_department_rejected() {
        let (_t, storage) = storage();
        let budget_id = seeded_budget(&storage);
        let service = AllocationService::new(&storage);

        service
            .allocate(budget_id, "Registrar", Money::from_pesos(100), "bursar")
            .unwrap();
        let err = service
            .allocate(budget_id, "registrar", Money::from_pesos(100), "bursar")
            .unwrap_err();
        assert!(matches!(err, FundwatchError::Duplicate { .. }));
    }

    #[test]
    fn test_adjust_moves_budget_both_ways() {
        let (_t, storage) = storage();
        let budget_id = seeded_budget(&storage);
        let service = AllocationService::new(&storage);

        let allocation = service
            .allocate(budget_id, "Registrar", Money::from_pesos(300_000), "bursar")
            .unwrap();

        let grown = service
            .adjust(allocation.id, Money::from_pesos(50_000), "supplemental", "bursar")
            .unwrap();
        assert_eq!(grown.allocated, Money::from_pesos(350_000));
        assert_eq!(
            storage.budgets.get(budget_id).unwrap().unwrap().remaining,
            Money::from_pesos(650_000)
        );

        let shrunk = service
            .adjust(grown.id, -Money::from_pesos(150_000), "reversion", "bursar")
            .unwrap();
        assert_eq!(shrunk.allocated, Money::from_pesos(200_000));
        assert_eq!(
            storage.budgets.get(budget_id).unwrap().unwrap().remaining,
            Money::from_pesos(800_000)
        );

        // Chain continuity across the three ledger entries
        let chain = storage.ledger.for_allocation(allocation.id).unwrap();
        assert_eq!(chain.len(), 3);
        for pair in chain.windows(2) {
            assert_eq!(pair[0].new_balance, pair[1].previous_balance);
        }
    }

    #[test]
    fn test_adjust_beyond_budget_fails() {
        let (_t, storage) = storage();
        let budget_id = seeded_budget(&storage);
        let service = AllocationService::new(&storage);

        let allocation = service
            .allocate(budget_id, "Registrar", Money::from_pesos(900_000), "bursar")
            .unwrap();

        let err = service
            .adjust(allocation.id, Money::from_pesos(200_000), "", "bursar")
            .unwrap_err();
        assert!(matches!(err, FundwatchError::Budget(_)));
    }
}
