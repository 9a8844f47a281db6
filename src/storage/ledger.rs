//! Ledger repository for JSON storage
//!
//! The ledger is append-only: entries are added and never modified.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{AllocationId, LedgerEntry};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable ledger data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct LedgerData {
    #[serde(default)]
    entries: Vec<LedgerEntry>,
}

/// Repository for balance ledger persistence
pub struct LedgerRepository {
    path: PathBuf,
    entries: RwLock<Vec<LedgerEntry>>,
}

impl LedgerRepository {
    /// Create a new ledger repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Load entries from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: LedgerData = read_json(&self.path)?;

        let mut entries = self.entries.write().map_err(lock_err)?;
        *entries = file_data.entries;
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(())
    }

    /// Save entries to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let entries = self.entries.read().map_err(lock_err)?;
        write_json_atomic(
            &self.path,
            &LedgerData {
                entries: entries.clone(),
            },
        )
    }

    /// Append an entry
    pub fn append(&self, entry: LedgerEntry) -> Result<(), FundwatchError> {
        let mut entries = self.entries.write().map_err(lock_err)?;
        entries.push(entry);
        Ok(())
    }

    /// All entries in chronological order
    pub fn get_all(&self) -> Result<Vec<LedgerEntry>, FundwatchError> {
        let entries = self.entries.read().map_err(lock_err)?;
        Ok(entries.clone())
    }

    /// Entries for one allocation in chronological order
    pub fn for_allocation(
        &self,
        allocation_id: AllocationId,
    ) -> Result<Vec<LedgerEntry>, FundwatchError> {
        let entries = self.entries.read().map_err(lock_err)?;
        Ok(entries
            .iter()
            .filter(|e| e.allocation_id == allocation_id)
            .cloned()
            .collect())
    }

    /// The most recent N entries across all allocations
    pub fn recent(&self, count: usize) -> Result<Vec<LedgerEntry>, FundwatchError> {
        let entries = self.entries.read().map_err(lock_err)?;
        let start = entries.len().saturating_sub(count);
        Ok(entries[start..].to_vec())
    }

    /// Number of entries
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let entries = self.entries.read().map_err(lock_err)?;
        Ok(entries.len())
    }
}
