//! PRE repository for JSON storage
//!
//! Line items and receipts are embedded in the PRE document, so the file is
//! the complete planning record for each department.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{AllocationId, Pre, PreId, RequestStatus};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable PRE data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PreData {
    #[serde(default)]
    pres: Vec<Pre>,
}

/// Repository for PRE persistence
pub struct PreRepository {
    path: PathBuf,
    records: RwLock<HashMap<PreId, Pre>>,
}

impl PreRepository {
    /// Create a new PRE repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load PREs from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: PreData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for pre in file_data.pres {
            records.insert(pre.id, pre);
        }

        Ok(())
    }

    /// Save PREs to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut pres: Vec<_> = records.values().cloned().collect();
        pres.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &PreData { pres })
    }

    /// Get a PRE by ID
    pub fn get(&self, id: PreId) -> Result<Option<Pre>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all PREs, newest first, including archived
    pub fn get_all(&self) -> Result<Vec<Pre>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Get non-archived PREs, newest first
    pub fn active(&self) -> Result<Vec<Pre>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| !p.archive.is_archived())
            .collect())
    }

    /// Get archived PREs
    pub fn archived(&self) -> Result<Vec<Pre>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.archive.is_archived())
            .collect())
    }

    /// Active PREs for an allocation
    pub fn for_allocation(&self, allocation_id: AllocationId) -> Result<Vec<Pre>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|p| p.allocation_id == allocation_id)
            .collect())
    }

    /// The approved PRE for an allocation, if any
    pub fn approved_for_allocation(
        &self,
        allocation_id: AllocationId,
    ) -> Result<Option<Pre>, FundwatchError> {
        Ok(self
            .for_allocation(allocation_id)?
            .into_iter()
            .find(|p| p.status == RequestStatus::Approved))
    }

    /// Insert or update a PRE
    pub fn upsert(&self, pre: Pre) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(pre.id, pre);
        Ok(())
    }

    /// Count all PREs
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FiscalYear;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PreRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pres.json");
        (temp_dir, PreRepository::new(path))
    }

    fn pre(allocation_id: AllocationId) -> Pre {
        Pre::new(
            allocation_id,
            "Registrar",
            FiscalYear::parse("2025").unwrap(),
            "registrar-head",
        )
    }

    #[test]
    fn test_for_allocation() {
        let (_t, repo) = create_test_repo();
        repo.load().unwrap();

        let allocation_id = AllocationId::new();
        repo.upsert(pre(allocation_id)).unwrap();
        repo.upsert(pre(allocation_id)).unwrap();
        repo.upsert(pre(AllocationId::new())).unwrap();

        assert_eq!(repo.for_allocation(allocation_id).unwrap().len(), 2);
    }

    #[test]
    fn test_approved_for_allocation() {
        let (_t, repo) = create_test_repo();
        repo.load().unwrap();

        let allocation_id = AllocationId::new();
        let mut approved = pre(allocation_id);
        approved.status = RequestStatus::Approved;
        let approved_id = approved.id;

        repo.upsert(pre(allocation_id)).unwrap();
        repo.upsert(approved).unwrap();

        let found = repo.approved_for_allocation(allocation_id).unwrap().unwrap();
        assert_eq!(found.id, approved_id);

        assert!(repo
            .approved_for_allocation(AllocationId::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_save_and_reload_preserves_line_items() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        use crate::models::pre::{LineItem, Section};
        use crate::models::{Money, QuarterAmounts};

        let mut p = pre(AllocationId::new());
        p.push_line_item(LineItem::new(
            Section::Mooe,
            "Training Expenses",
            QuarterAmounts::new(
                Money::from_pesos(10),
                Money::zero(),
                Money::zero(),
                Money::zero(),
            ),
        ));
        let id = p.id;
        repo.upsert(p).unwrap();
        repo.save().unwrap();

        let repo2 = PreRepository::new(temp_dir.path().join("pres.json"));
        repo2.load().unwrap();
        let loaded = repo2.get(id).unwrap().unwrap();
        assert_eq!(loaded.line_items.len(), 1);
        assert_eq!(loaded.total_amount, Money::from_pesos(10));
    }
}
