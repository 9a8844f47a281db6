//! Archive CLI commands

use chrono::Datelike;
use clap::Subcommand;

use crate::display;
use crate::error::FundwatchResult;
use crate::models::ArchiveType;
use crate::services::{ArchiveService, BudgetService};
use crate::storage::Storage;

use super::resolve_allocation;

/// Archive subcommands
#[derive(Subcommand)]
pub enum ArchiveCommands {
    /// Archive a budget and everything under it
    Budget {
        /// Fiscal year or budget id
        budget: String,
        /// Reason for archiving
        #[arg(short, long, default_value = "manual archive")]
        reason: String,
    },

    /// Archive an allocation and its documents
    Allocation {
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
        /// Reason for archiving
        #[arg(short, long, default_value = "manual archive")]
        reason: String,
    },

    /// Archive every budget from past fiscal years
    Sweep,

    /// Restore an archived budget (cascade-archived children come back)
    RestoreBudget {
        /// Fiscal year or budget id
        budget: String,
    },

    /// Restore an archived allocation and all its documents
    RestoreAllocation {
        /// Allocation id
        allocation: String,
    },

    /// List archived budgets
    List,
}

/// Handle an archive command
pub fn handle_archive_command(
    storage: &Storage,
    actor: &str,
    cmd: ArchiveCommands,
) -> FundwatchResult<()> {
    let service = ArchiveService::new(storage);

    match cmd {
        ArchiveCommands::Budget { budget, reason } => {
            let budget = BudgetService::new(storage).resolve(&budget)?;
            service.archive_budget(budget.id, ArchiveType::Manual, &reason, actor)?;
            println!(
                "Archived budget '{}' (FY {}) and its documents.",
                budget.title, budget.fiscal_year
            );
        }

        ArchiveCommands::Allocation {
            allocation,
            budget,
            reason,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;
            service.archive_allocation(allocation.id, &reason, actor)?;
            println!(
                "Archived allocation '{}' and its documents.",
                allocation.department
            );
        }

        ArchiveCommands::Sweep => {
            let current_year = chrono::Local::now().year();
            println!("Checking for budgets older than {}...", current_year);

            let outcome = service.sweep(current_year, actor)?;
            if outcome.archived.is_empty() {
                println!("No past fiscal year budgets found to archive.");
            } else {
                for (title, fiscal_year) in &outcome.archived {
                    println!("Archived '{}' (FY {}).", title, fiscal_year);
                }
                println!(
                    "Successfully archived {} past fiscal year budget(s).",
                    outcome.archived.len()
                );
            }
        }

        ArchiveCommands::RestoreBudget { budget } => {
            let budget = BudgetService::new(storage).resolve_any(&budget)?;
            service.restore_budget(budget.id, actor)?;
            println!(
                "Restored budget '{}' (FY {}); manually archived documents stay archived.",
                budget.title, budget.fiscal_year
            );
        }

        ArchiveCommands::RestoreAllocation { allocation } => {
            let allocation = resolve_allocation(storage, &allocation, None)?;
            service.restore_allocation(allocation.id, actor)?;
            println!("Restored allocation '{}' and its documents.", allocation.department);
        }

        ArchiveCommands::List => {
            let archived = storage.budgets.archived()?;
            println!("{}", display::format_budget_list(&archived));
        }
    }

    Ok(())
}
