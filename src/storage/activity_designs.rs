//! Activity design repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{ActivityDesign, ActivityDesignId, AllocationId, RequestStatus};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable activity design data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ActivityDesignData {
    #[serde(default)]
    activity_designs: Vec<ActivityDesign>,
}

/// Repository for activity design persistence
pub struct ActivityDesignRepository {
    path: PathBuf,
    records: RwLock<HashMap<ActivityDesignId, ActivityDesign>>,
}

impl ActivityDesignRepository {
    /// Create a new activity design repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load activity designs from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: ActivityDesignData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for ad in file_data.activity_designs {
            records.insert(ad.id, ad);
        }

        Ok(())
    }

    /// Save activity designs to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut activity_designs: Vec<_> = records.values().cloned().collect();
        activity_designs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &ActivityDesignData { activity_designs })
    }

    /// Get an activity design by ID
    pub fn get(&self, id: ActivityDesignId) -> Result<Option<ActivityDesign>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all activity designs, newest first, including archived
    pub fn get_all(&self) -> Result<Vec<ActivityDesign>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Get non-archived activity designs, newest first
    pub fn active(&self) -> Result<Vec<ActivityDesign>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|a| !a.archive.is_archived())
            .collect())
    }

    /// Get archived activity designs
    pub fn archived(&self) -> Result<Vec<ActivityDesign>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|a| a.archive.is_archived())
            .collect())
    }

    /// Active activity designs for an allocation
    pub fn for_allocation(
        &self,
        allocation_id: AllocationId,
    ) -> Result<Vec<ActivityDesign>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|a| a.allocation_id == allocation_id)
            .collect())
    }

    /// Active activity designs with a given status
    pub fn with_status(&self, status: RequestStatus) -> Result<Vec<ActivityDesign>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|a| a.status == status)
            .collect())
    }

    /// Find an active activity design by document number
    pub fn find_by_number(&self, ad_number: &str) -> Result<Option<ActivityDesign>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let number_lower = ad_number.to_lowercase();
        Ok(records
            .values()
            .find(|a| !a.archive.is_archived() && a.ad_number.to_lowercase() == number_lower)
            .cloned())
    }

    /// Insert or update an activity design
    pub fn upsert(&self, ad: ActivityDesign) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(ad.id, ad);
        Ok(())
    }

    /// Count all activity designs
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}
