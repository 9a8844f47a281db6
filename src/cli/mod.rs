//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the service layer.

pub mod activity;
pub mod allocation;
pub mod archive;
pub mod audit;
pub mod budget;
pub mod export;
pub mod pre;
pub mod realign;
pub mod report;
pub mod request;
pub mod savings;

pub use activity::{handle_ad_command, AdCommands};
pub use allocation::{handle_alloc_command, AllocCommands};
pub use archive::{handle_archive_command, ArchiveCommands};
pub use audit::{handle_audit_command, AuditCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use export::{handle_export_command, ExportCommands};
pub use pre::{handle_pre_command, PreCommands};
pub use realign::{handle_realign_command, RealignCommands};
pub use report::{handle_report_command, ReportCommands};
pub use request::{handle_pr_command, PrCommands};
pub use savings::{handle_savings_command, SavingsCommands};

use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{Allocation, Money};
use crate::services::{AllocationService, BudgetService};
use crate::storage::Storage;

/// Parse a money argument, mapping parse failures to validation errors
pub(crate) fn parse_money(value: &str) -> FundwatchResult<Money> {
    Money::parse(value).map_err(|e| FundwatchError::Validation(format!("Invalid amount: {}", e)))
}

/// Resolve an allocation from an id, or a department name plus a budget
/// reference (fiscal year or id)
pub(crate) fn resolve_allocation(
    storage: &Storage,
    reference: &str,
    budget: Option<&str>,
) -> FundwatchResult<Allocation> {
    let budget_id = match budget {
        Some(budget_ref) => Some(BudgetService::new(storage).resolve(budget_ref)?.id),
        None => None,
    };
    AllocationService::new(storage).resolve(reference, budget_id)
}
