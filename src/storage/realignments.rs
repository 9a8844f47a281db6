//! Realignment repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{LineItemId, PreId, Realignment, RealignmentId};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable realignment data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RealignmentData {
    #[serde(default)]
    realignments: Vec<Realignment>,
}

/// Repository for realignment persistence
pub struct RealignmentRepository {
    path: PathBuf,
    records: RwLock<HashMap<RealignmentId, Realignment>>,
}

impl RealignmentRepository {
    /// Create a new realignment repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load realignments from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: RealignmentData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for realignment in file_data.realignments {
            records.insert(realignment.id, realignment);
        }

        Ok(())
    }

    /// Save realignments to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut realignments: Vec<_> = records.values().cloned().collect();
        realignments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &RealignmentData { realignments })
    }

    /// Get a realignment by ID
    pub fn get(&self, id: RealignmentId) -> Result<Option<Realignment>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all realignments, newest first, including archived
    pub fn get_all(&self) -> Result<Vec<Realignment>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Get non-archived realignments, newest first
    pub fn active(&self) -> Result<Vec<Realignment>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| !r.archive.is_archived())
            .collect())
    }

    /// Get archived realignments
    pub fn archived(&self) -> Result<Vec<Realignment>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.archive.is_archived())
            .collect())
    }

    /// Active realignments drawing from a source PRE
    pub fn for_source_pre(&self, pre_id: PreId) -> Result<Vec<Realignment>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|r| r.source_pre == pre_id)
            .collect())
    }

    /// Active in-review realignments drawing from a source line item,
    /// excluding one (used to avoid double-counting the request being checked)
    pub fn pending_for_source_item(
        &self,
        line_item_id: LineItemId,
        exclude: Option<RealignmentId>,
    ) -> Result<Vec<Realignment>, FundwatchError> {
        Ok(self
            .active()?
            .into_iter()
            .filter(|r| {
                r.source_line_item == line_item_id
                    && r.status.is_in_review()
                    && Some(r.id) != exclude
            })
            .collect())
    }

    /// Insert or update a realignment
    pub fn upsert(&self, realignment: Realignment) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(realignment.id, realignment);
        Ok(())
    }

    /// Count all realignments
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}
