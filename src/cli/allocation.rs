//! Allocation CLI commands

use clap::Subcommand;

use crate::display;
use crate::error::FundwatchResult;
use crate::services::{AllocationService, BudgetService};
use crate::storage::Storage;

use super::{parse_money, resolve_allocation};

/// Allocation subcommands
#[derive(Subcommand)]
pub enum AllocCommands {
    /// Carve a department allocation out of a budget
    Add {
        /// Fiscal year or budget id
        budget: String,
        /// Department name
        department: String,
        /// Amount to allocate
        amount: String,
    },

    /// List allocations
    List {
        /// Limit to one budget (fiscal year or id)
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show one allocation with its balance history
    Show {
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Adjust an allocation up or down
    Adjust {
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Signed amount (e.g. "50000" or "-25000")
        amount: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
        /// Remarks recorded in the ledger
        #[arg(short, long, default_value = "")]
        remarks: String,
    },
}

/// Handle an allocation command
pub fn handle_alloc_command(
    storage: &Storage,
    actor: &str,
    cmd: AllocCommands,
) -> FundwatchResult<()> {
    let service = AllocationService::new(storage);

    match cmd {
        AllocCommands::Add {
            budget,
            department,
            amount,
        } => {
            let budget = BudgetService::new(storage).resolve(&budget)?;
            let amount = parse_money(&amount)?;

            let allocation = service.allocate(budget.id, &department, amount, actor)?;

            println!(
                "Allocated {} to '{}' from FY {} budget.",
                allocation.allocated, allocation.department, budget.fiscal_year
            );
            println!("  ID: {}", allocation.id);

            let updated = BudgetService::new(storage).get(budget.id)?;
            println!("  Budget unallocated balance: {}", updated.remaining);
        }

        AllocCommands::List { budget } => {
            let budget_id = match budget {
                Some(reference) => Some(BudgetService::new(storage).resolve(&reference)?.id),
                None => None,
            };
            let allocations = service.list(budget_id)?;
            println!("{}", display::format_allocation_list(&allocations));
        }

        AllocCommands::Show { allocation, budget } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;

            println!("{}", allocation);
            println!("  ID:        {}", allocation.id);
            println!("  PRE total: {}", allocation.pre_used);
            println!("  PR used:   {}", allocation.pr_used);
            println!("  AD used:   {}", allocation.ad_used);
            println!("  Used:      {:.1}%", allocation.utilization_percent());

            let entries = storage.ledger.for_allocation(allocation.id)?;
            if !entries.is_empty() {
                println!("\nBalance history:");
                println!("{}", display::format_ledger(&entries));
            }
        }

        AllocCommands::Adjust {
            allocation,
            amount,
            budget,
            remarks,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;
            let delta = parse_money(&amount)?;

            let updated = service.adjust(allocation.id, delta, &remarks, actor)?;

            println!(
                "Adjusted '{}' by {}; now {} allocated, {} remaining.",
                updated.department,
                delta,
                updated.allocated,
                updated.remaining_balance()
            );
        }
    }

    Ok(())
}
