//! Savings snapshot repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{AllocationId, SavingsSnapshot, SnapshotId};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable savings data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SavingsData {
    #[serde(default)]
    snapshots: Vec<SavingsSnapshot>,
}

/// Repository for savings snapshot persistence
pub struct SavingsRepository {
    path: PathBuf,
    records: RwLock<HashMap<SnapshotId, SavingsSnapshot>>,
}

impl SavingsRepository {
    /// Create a new savings repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load snapshots from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: SavingsData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for snapshot in file_data.snapshots {
            records.insert(snapshot.id, snapshot);
        }

        Ok(())
    }

    /// Save snapshots to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut snapshots: Vec<_> = records.values().cloned().collect();
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &SavingsData { snapshots })
    }

    /// Get a snapshot by ID
    pub fn get(&self, id: SnapshotId) -> Result<Option<SavingsSnapshot>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all snapshots, newest first
    pub fn get_all(&self) -> Result<Vec<SavingsSnapshot>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Snapshots for one allocation, newest first
    pub fn for_allocation(
        &self,
        allocation_id: AllocationId,
    ) -> Result<Vec<SavingsSnapshot>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|s| s.allocation_id == allocation_id)
            .collect())
    }

    /// Insert or update a snapshot
    pub fn upsert(&self, snapshot: SavingsSnapshot) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(snapshot.id, snapshot);
        Ok(())
    }

    /// Count all snapshots
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FiscalYear, Money};
    use tempfile::TempDir;

    fn snapshot(allocation_id: AllocationId) -> SavingsSnapshot {
        SavingsSnapshot::new(
            allocation_id,
            FiscalYear::parse("2025").unwrap(),
            "Registrar",
            Money::from_pesos(100),
            Money::from_pesos(40),
            Money::from_pesos(10),
            "Full Year",
            "bursar",
        )
    }

    #[test]
    fn test_for_allocation() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SavingsRepository::new(temp_dir.path().join("savings.json"));
        repo.load().unwrap();

        let a = AllocationId::new();
        repo.upsert(snapshot(a)).unwrap();
        repo.upsert(snapshot(AllocationId::new())).unwrap();

        assert_eq!(repo.for_allocation(a).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("savings.json");
        let repo = SavingsRepository::new(path.clone());
        repo.load().unwrap();

        let s = snapshot(AllocationId::new());
        let id = s.id;
        repo.upsert(s).unwrap();
        repo.save().unwrap();

        let repo2 = SavingsRepository::new(path);
        repo2.load().unwrap();
        let loaded = repo2.get(id).unwrap().unwrap();
        assert_eq!(loaded.savings, Money::from_pesos(50));
    }
}
