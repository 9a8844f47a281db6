//! Purchase request repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{AllocationId, PurchaseRequest, PurchaseRequestId, RequestStatus};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable purchase request data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PurchaseRequestData {
    #[serde(default)]
    purchase_requests: Vec<PurchaseRequest>,
}

/// Repository for purchase request persistence
pub struct PurchaseRequestRepository {
    path: PathBuf,
    records: RwLock<HashMap<PurchaseRequestId, PurchaseRequest>>,
}

impl PurchaseRequestRepository {
    /// Create a new purchase request repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load purchase requests from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: PurchaseRequestData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for pr in file_data.purchase_requests {
            records.insert(pr.id, pr);
        }

        Ok(())
    }

    /// Save purchase requests to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut purchase_requests: Vec<_> = records.values().cloned().collect();
        purchase_requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &PurchaseRequestData { purchase_requests })
    }

    /// Get a purchase request by ID
    pub fn get(&self, id: PurchaseRequestId) -> Result<Option<PurchaseRequest>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all purchase requests, newest first, including archived
    pub fn get_all(&self) -> Result<Vec<PurchaseRequest>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Get non-archived purchase requests, newest first
    pub fn active(&self) -> Result<Vec<PurchaseRequest>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| !p.archive.is_archived())
            .collect())
    }

    /// Get archived purchase requests
    pub fn archived(&self) -> Result<Vec<PurchaseRequest>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.archive.is_archived())
            .collect())
    }

    /// Active purchase requests for an allocation
    pub fn for_allocation(
        &self,
        allocation_id: AllocationId,
    ) -> Result<Vec<PurchaseRequest>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|p| p.allocation_id == allocation_id)
            .collect())
    }

    /// Active purchase requests with a given status
    pub fn with_status(&self, status: RequestStatus) -> Result<Vec<PurchaseRequest>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|p| p.status == status)
            .collect())
    }

    /// Find an active purchase request by document number
    pub fn find_by_number(&self, pr_number: &str) -> Result<Option<PurchaseRequest>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let number_lower = pr_number.to_lowercase();
        Ok(records
            .values()
            .find(|p| !p.archive.is_archived() && p.pr_number.to_lowercase() == number_lower)
            .cloned())
    }

    /// Insert or update a purchase request
    pub fn upsert(&self, pr: PurchaseRequest) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(pr.id, pr);
        Ok(())
    }

    /// Count all purchase requests
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PurchaseRequestRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("purchase_requests.json");
        (temp_dir, PurchaseRequestRepository::new(path))
    }

    fn pr(number: &str, allocation_id: AllocationId) -> PurchaseRequest {
        PurchaseRequest::new(number, allocation_id, "Registrar", "supplies", "clerk")
    }

    #[test]
    fn test_find_by_number_case_insensitive() {
        let (_t, repo) = create_test_repo();
        repo.load().unwrap();

        repo.upsert(pr("PR-2025-0001", AllocationId::new())).unwrap();

        assert!(repo.find_by_number("pr-2025-0001").unwrap().is_some());
        assert!(repo.find_by_number("PR-2025-0002").unwrap().is_none());
    }

    #[test]
    fn test_with_status() {
        let (_t, repo) = create_test_repo();
        repo.load().unwrap();

        let allocation_id = AllocationId::new();
        let mut submitted = pr("PR-1", allocation_id);
        submitted.submit().unwrap();
        repo.upsert(submitted).unwrap();
        repo.upsert(pr("PR-2", allocation_id)).unwrap();

        assert_eq!(repo.with_status(RequestStatus::Pending).unwrap().len(), 1);
        assert_eq!(repo.with_status(RequestStatus::Draft).unwrap().len(), 1);
        assert_eq!(repo.with_status(RequestStatus::Approved).unwrap().len(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let doc = pr("PR-1", AllocationId::new());
        let id = doc.id;
        repo.upsert(doc).unwrap();
        repo.save().unwrap();

        let repo2 = PurchaseRequestRepository::new(temp_dir.path().join("purchase_requests.json"));
        repo2.load().unwrap();
        assert!(repo2.get(id).unwrap().is_some());
    }
}
