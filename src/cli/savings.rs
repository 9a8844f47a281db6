//! Savings CLI commands

use clap::Subcommand;

use crate::display;
use crate::error::FundwatchResult;
use crate::services::SavingsService;
use crate::storage::Storage;

use super::resolve_allocation;

/// Savings subcommands
#[derive(Subcommand)]
pub enum SavingsCommands {
    /// Capture a savings snapshot for an allocation
    Snapshot {
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
        /// Coverage label: Q1-Q4 or "Full Year"
        #[arg(short, long, default_value = "Full Year")]
        quarter: String,
        /// Notes on the snapshot
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List savings snapshots
    List {
        /// Limit to one allocation
        #[arg(long)]
        allocation: Option<String>,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show a snapshot with its line breakdown
    Show {
        /// Snapshot id
        id: String,
    },
}

/// Handle a savings command
pub fn handle_savings_command(
    storage: &Storage,
    actor: &str,
    cmd: SavingsCommands,
) -> FundwatchResult<()> {
    let service = SavingsService::new(storage);

    match cmd {
        SavingsCommands::Snapshot {
            allocation,
            budget,
            quarter,
            notes,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;
            let snapshot = service.snapshot(allocation.id, &quarter, &notes, actor)?;

            println!("Captured snapshot {} for '{}'.", snapshot.id, snapshot.department);
            println!("{}", display::format_savings(&snapshot));
        }

        SavingsCommands::List { allocation, budget } => {
            let allocation_id = match allocation {
                Some(reference) => {
                    Some(resolve_allocation(storage, &reference, budget.as_deref())?.id)
                }
                None => None,
            };

            let snapshots = service.list(allocation_id)?;
            if snapshots.is_empty() {
                println!("No savings snapshots on record.");
            } else {
                for snapshot in snapshots {
                    println!(
                        "{}  {}  ({}, {:.1}% saved)",
                        snapshot.id,
                        snapshot,
                        snapshot.quarter_label,
                        snapshot.savings_rate()
                    );
                }
            }
        }

        SavingsCommands::Show { id } => {
            let snapshot = service.resolve(&id)?;
            println!("{}", display::format_savings(&snapshot));
        }
    }

    Ok(())
}
