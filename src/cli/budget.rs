//! Budget CLI commands

use clap::Subcommand;

use crate::display;
use crate::error::FundwatchResult;
use crate::models::FiscalYear;
use crate::services::{AllocationService, BudgetService};
use crate::storage::Storage;

use super::parse_money;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Record an approved budget for a fiscal year
    Add {
        /// Budget title
        title: String,
        /// Fiscal year (e.g. "2025" or "2025-2026")
        fiscal_year: String,
        /// Approved amount (e.g. "5,000,000.00")
        amount: String,
        /// Free-form description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List budgets
    List {
        /// Include archived budgets
        #[arg(long)]
        all: bool,
    },

    /// Show a budget and its allocations
    Show {
        /// Fiscal year or budget id
        budget: String,
    },

    /// Update a budget's title, description, or amount
    Update {
        /// Fiscal year or budget id
        budget: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New total amount
        #[arg(long)]
        amount: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    actor: &str,
    cmd: BudgetCommands,
) -> FundwatchResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Add {
            title,
            fiscal_year,
            amount,
            description,
        } => {
            let fiscal_year = FiscalYear::parse(&fiscal_year)
                .map_err(|e| crate::error::FundwatchError::Validation(e.to_string()))?;
            let amount = parse_money(&amount)?;

            let budget = service.create_budget(&title, fiscal_year, amount, &description, actor)?;

            println!("Recorded budget '{}' for FY {}.", budget.title, budget.fiscal_year);
            println!("  Amount: {}", budget.amount);
            println!("  ID:     {}", budget.id);
        }

        BudgetCommands::List { all } => {
            let budgets = service.list(all)?;
            println!("{}", display::format_budget_list(&budgets));

            let totals = service.totals(None)?;
            if totals.count > 0 {
                println!(
                    "\n{} budget(s), {} total, {} unallocated ({:.1}% allocated)",
                    totals.count,
                    totals.total,
                    totals.remaining,
                    totals.utilization_percent()
                );
            }
        }

        BudgetCommands::Show { budget } => {
            let budget = service.resolve(&budget)?;
            let allocations = AllocationService::new(storage).list(Some(budget.id))?;
            println!("{}", display::format_budget_detail(&budget, &allocations));
        }

        BudgetCommands::Update {
            budget,
            title,
            description,
            amount,
        } => {
            let budget = service.resolve(&budget)?;
            let amount = amount.as_deref().map(parse_money).transpose()?;

            let updated = service.update_budget(
                budget.id,
                title.as_deref(),
                description.as_deref(),
                amount,
                actor,
            )?;

            println!("Updated budget '{}' (FY {}).", updated.title, updated.fiscal_year);
            println!("  Amount: {} ({} unallocated)", updated.amount, updated.remaining);
        }
    }

    Ok(())
}
