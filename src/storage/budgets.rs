//! Approved budget repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FundwatchError;
use crate::models::{ApprovedBudget, BudgetId, FiscalYear};

use super::file_io::{read_json, write_json_atomic};

fn lock_err<E: std::fmt::Display>(e: E) -> FundwatchError {
    FundwatchError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Serializable budget data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<ApprovedBudget>,
}

/// Repository for approved budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    records: RwLock<HashMap<BudgetId, ApprovedBudget>>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), FundwatchError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut records = self.records.write().map_err(lock_err)?;
        records.clear();
        for budget in file_data.budgets {
            records.insert(budget.id, budget);
        }

        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> Result<(), FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;

        let mut budgets: Vec<_> = records.values().cloned().collect();
        budgets.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        write_json_atomic(&self.path, &BudgetData { budgets })
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> Result<Option<ApprovedBudget>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.get(&id).cloned())
    }

    /// Get all budgets, newest first, including archived
    pub fn get_all(&self) -> Result<Vec<ApprovedBudget>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut list: Vec<_> = records.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Get non-archived budgets, newest first
    pub fn active(&self) -> Result<Vec<ApprovedBudget>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| !b.archive.is_archived())
            .collect())
    }

    /// Get archived budgets, newest first
    pub fn archived(&self) -> Result<Vec<ApprovedBudget>, FundwatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| b.archive.is_archived())
            .collect())
    }

    /// Find the active budget for a fiscal year
    pub fn find_by_fiscal_year(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<ApprovedBudget>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records
            .values()
            .find(|b| !b.archive.is_archived() && &b.fiscal_year == fiscal_year)
            .cloned())
    }

    /// Fiscal years with any budget on record, newest first
    pub fn fiscal_years(&self) -> Result<Vec<FiscalYear>, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        let mut years: Vec<_> = records.values().map(|b| b.fiscal_year.clone()).collect();
        years.sort();
        years.dedup();
        years.reverse();
        Ok(years)
    }

    /// Insert or update a budget
    pub fn upsert(&self, budget: ApprovedBudget) -> Result<(), FundwatchError> {
        let mut records = self.records.write().map_err(lock_err)?;
        records.insert(budget.id, budget);
        Ok(())
    }

    /// Count all budgets
    pub fn count(&self) -> Result<usize, FundwatchError> {
        let records = self.records.read().map_err(lock_err)?;
        Ok(records.len())
    }
}
