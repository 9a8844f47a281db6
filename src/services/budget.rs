//! Approved budget service
//!
//! Business logic for recording and maintaining fiscal-year budgets.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{ApprovedBudget, BudgetId, FiscalYear, Money};
use crate::storage::Storage;

/// Service for approved budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Aggregate figures across budgets
#[derive(Debug, Clone)]
pub struct BudgetTotals {
    pub total: Money,
    pub remaining: Money,
    pub count: usize,
}

impl BudgetTotals {
    /// Percentage of the total already carved into allocations
    pub fn utilization_percent(&self) -> f64 {
        (self.total - self.remaining).percent_of(self.total)
    }
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an approved budget for a fiscal year
    pub fn create_budget(
        &self,
        title: &str,
        fiscal_year: FiscalYear,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> FundwatchResult<ApprovedBudget> {
        if self
            .storage
            .budgets
            .find_by_fiscal_year(&fiscal_year)?
            .is_some()
        {
            return Err(FundwatchError::Duplicate {
                entity_type: "Budget",
                identifier: fiscal_year.to_string(),
            });
        }

        let mut budget = ApprovedBudget::new(title, fiscal_year, amount, actor);
        budget.description = description.to_string();

        budget
            .validate()
            .map_err(|e| FundwatchError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.title.clone()),
            actor,
            &budget,
        )?;

        info!(budget = %budget.id, fiscal_year = %budget.fiscal_year, "budget recorded");
        Ok(budget)
    }

    /// Update a budget's title, description, or total amount
    ///
    /// Resizing keeps the allocated portion intact; shrinking below it fails.
    pub fn update_budget(
        &self,
        id: BudgetId,
        title: Option<&str>,
        description: Option<&str>,
        amount: Option<Money>,
        actor: &str,
    ) -> FundwatchResult<ApprovedBudget> {
        let mut budget = self.get(id)?;
        if budget.archive.is_archived() {
            return Err(FundwatchError::Archived(budget.title));
        }
        let before = budget.clone();

        if let Some(title) = title {
            budget.title = title.to_string();
        }
        if let Some(description) = description {
            budget.description = description.to_string();
        }
        if let Some(amount) = amount {
            budget
                .resize(amount)
                .map_err(|e| FundwatchError::Budget(e.to_string()))?;
        }

        budget
            .validate()
            .map_err(|e| FundwatchError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_update(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.title.clone()),
            actor,
            &before,
            &budget,
        )?;

        Ok(budget)
    }

    /// Get a budget by id
    pub fn get(&self, id: BudgetId) -> FundwatchResult<ApprovedBudget> {
        self.storage
            .budgets
            .get(id)?
            .ok_or_else(|| FundwatchError::budget_not_found(id.to_string()))
    }

    /// Resolve a budget from a fiscal year label or id string
    pub fn resolve(&self, reference: &str) -> FundwatchResult<ApprovedBudget> {
        if let Ok(fiscal_year) = FiscalYear::parse(reference) {
            if let Some(budget) = self.storage.budgets.find_by_fiscal_year(&fiscal_year)? {
                return Ok(budget);
            }
        }
        if let Ok(id) = reference.parse::<BudgetId>() {
            if let Some(budget) = self.storage.budgets.get(id)? {
                return Ok(budget);
            }
        }
        Err(FundwatchError::budget_not_found(reference))
    }

    /// Resolve a budget including archived ones (for restore operations)
    pub fn resolve_any(&self, reference: &str) -> FundwatchResult<ApprovedBudget> {
        if let Ok(fiscal_year) = FiscalYear::parse(reference) {
            if let Some(budget) = self
                .storage
                .budgets
                .get_all()?
                .into_iter()
                .find(|b| b.fiscal_year == fiscal_year)
            {
                return Ok(budget);
            }
        }
        if let Ok(id) = reference.parse::<BudgetId>() {
            if let Some(budget) = self.storage.budgets.get(id)? {
                return Ok(budget);
            }
        }
        Err(FundwatchError::budget_not_found(reference))
    }

    /// List budgets, optionally including archived ones
    pub fn list(&self, include_archived: bool) -> FundwatchResult<Vec<ApprovedBudget>> {
        if include_archived {
            self.storage.budgets.get_all()
        } else {
            self.storage.budgets.active()
        }
    }

    /// Totals across active budgets, optionally filtered by fiscal year
    pub fn totals(&self, fiscal_year: Option<&FiscalYear>) -> FundwatchResult<BudgetTotals> {
        let budgets = self.storage.budgets.active()?;
        let filtered: Vec<_> = budgets
            .into_iter()
            .filter(|b| fiscal_year.map_or(true, |fy| &b.fiscal_year == fy))
            .collect();

        Ok(BudgetTotals {
            total: filtered.iter().map(|b| b.amount).sum(),
            remaining: filtered.iter().map(|b| b.remaining).sum(),
            count: filtered.len(),
        })
    }
}
