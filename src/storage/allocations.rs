//! Department allocation repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{Allocation, AllocationId, BudgetId};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable allocation data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AllocationData {
    #[serde(default)]
    allocations: Vec<Allocation>,
}

/// Repository for allocation persistence
pub struct AllocationRepository {
    path: PathBuf,
    records: RwLock<HashMap<AllocationId, Allocation>>,
}

impl AllocationRepository {
    /// Create a new allocation repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load allocations from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: AllocationData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for allocation in file_data.allocations {
            records.insert(allocation.id, allocation);
        }

        Ok(())
    }

    /// Save allocations to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut allocations: Vec<_> = records.values().cloned().collect();
        allocations.sort_by(|a, b| {
            a.department
                .cmp(&b.department)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        write_json_atomic(&self.path, &AllocationData { allocations })
    }

    /// Get an allocation by ID
    pub fn get(&self, id: AllocationId) -> Result<Option<Allocation>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all allocations, including archived, sorted by department
    pub fn get_all(&self) -> Result<Vec<Allocation>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| a.department.cmp(&b.department));
        Ok(list)
    }

    /// Get non-archived allocations sorted by department
    pub fn active(&self) -> Result<Vec<Allocation>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|a| !a.archive.is_archived())
            .collect())
    }

    /// Get archived allocations
    pub fn archived(&self) -> Result<Vec<Allocation>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|a| a.archive.is_archived())
            .collect())
    }

    /// All allocations under a budget, including archived
    pub fn for_budget(&self, budget_id: BudgetId) -> Result<Vec<Allocation>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|a| a.budget_id == budget_id)
            .collect())
    }

    /// Find the active allocation for a department under a budget
    pub fn find_department(
        &self,
        budget_id: BudgetId,
        department: &str,
    ) -> Result<Option<Allocation>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let department_lower = department.to_lowercase();
        Ok(records
            .values()
            .find(|a| {
                !a.archive.is_archived()
                    && a.budget_id == budget_id
                    && a.department.to_lowercase() == department_lower
            })
            .cloned())
    }

    /// Insert or update an allocation
    pub fn upsert(&self, allocation: Allocation) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(allocation.id, allocation);
        Ok(())
    }

    /// Count all allocations
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveType, Money};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, AllocationRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("allocations.json");
        (temp_dir, AllocationRepository::new(path))
    }

    #[test]
    fn test_for_budget_and_find_department() {
        let (_t, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        let other_budget = BudgetId::new();
        repo.upsert(Allocation::new(budget_id, "Registrar", Money::from_pesos(100)))
            .unwrap();
        repo.upsert(Allocation::new(budget_id, "Library", Money::from_pesos(200)))
            .unwrap();
        repo.upsert(Allocation::new(other_budget, "Registrar", Money::from_pesos(300)))
            .unwrap();

        assert_eq!(repo.for_budget(budget_id).unwrap().len(), 2);

        let found = repo.find_department(budget_id, "registrar").unwrap().unwrap();
        assert_eq!(found.allocated, Money::from_pesos(100));
        assert!(repo.find_department(budget_id, "Clinic").unwrap().is_none());
    }

    #[test]
    fn test_find_department_skips_archived() {
        let (_t, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        let mut a = Allocation::new(budget_id, "Registrar", Money::from_pesos(100));
        a.archive.archive(ArchiveType::Manual, "bursar", "re-allocated");
        repo.upsert(a).unwrap();

        assert!(repo.find_department(budget_id, "Registrar").unwrap().is_none());
        assert_eq!(repo.archived().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reload_sorted() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let budget_id = BudgetId::new();
        repo.upsert(Allocation::new(budget_id, "Registrar", Money::from_pesos(1)))
            .unwrap();
        repo.upsert(Allocation::new(budget_id, "Clinic", Money::from_pesos(2)))
            .unwrap();
        repo.save().unwrap();

        let repo2 = AllocationRepository::new(temp_dir.path().join("allocations.json"));
        repo2.load().unwrap();
        let all = repo2.get_all().unwrap();
        assert_eq!(all[0].department, "Clinic");
        assert_eq!(all[1].department, "Registrar");
    }
}
