//! PRE CLI commands

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use crate::display;
use crate::error::{FundwatchError, FundwatchResult};
use crate::import::parse_pre_sheet;
use crate::models::pre::Section;
use crate::models::QuarterAmounts;
use crate::reports::QuarterlyReport;
use crate::services::PreService;
use crate::storage::Storage;

use super::{parse_money, resolve_allocation};

/// PRE subcommands
#[derive(Subcommand)]
pub enum PreCommands {
    /// Import a PRE from a CSV export of the template
    Import {
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Path to the CSV file
        file: PathBuf,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Start an empty draft PRE
    Draft {
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
        /// Program name
        #[arg(long)]
        program: Option<String>,
        /// Fund source
        #[arg(long)]
        fund_source: Option<String>,
    },

    /// Add a line item to a draft PRE
    AddItem {
        /// PRE id
        pre: String,
        /// Section: personnel, mooe, or capital
        section: Section,
        /// Line item name
        name: String,
        /// Q1 amount
        #[arg(long, default_value = "0")]
        q1: String,
        /// Q2 amount
        #[arg(long, default_value = "0")]
        q2: String,
        /// Q3 amount
        #[arg(long, default_value = "0")]
        q3: String,
        /// Q4 amount
        #[arg(long, default_value = "0")]
        q4: String,
        /// Subcategory heading
        #[arg(long, default_value = "")]
        subcategory: String,
    },

    /// List PREs
    List {
        /// Limit to one allocation
        #[arg(long)]
        allocation: Option<String>,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show a PRE with its line items
    Show {
        /// PRE id
        pre: String,
    },

    /// Submit a draft PRE for review
    Submit {
        /// PRE id
        pre: String,
    },

    /// Partially approve a pending PRE
    Review {
        /// PRE id
        pre: String,
        /// Reviewer notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Record that signed documents came back
    Countersign {
        /// PRE id
        pre: String,
    },

    /// Final approval: record the grand total against the allocation
    Finalize {
        /// PRE id
        pre: String,
    },

    /// Reject a PRE under review
    Reject {
        /// PRE id
        pre: String,
        /// Rejection reason
        reason: String,
    },

    /// Show the quarterly consumption breakdown
    Quarters {
        /// PRE id
        pre: String,
    },
}

/// Handle a PRE command
pub fn handle_pre_command(storage: &Storage, actor: &str, cmd: PreCommands) -> FundwatchResult<()> {
    let service = PreService::new(storage);

    match cmd {
        PreCommands::Import {
            allocation,
            file,
            budget,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;

            let reader = File::open(&file).map_err(|e| {
                FundwatchError::Import(format!("Failed to open {}: {}", file.display(), e))
            })?;
            let parsed = parse_pre_sheet(reader)?;

            for warning in &parsed.warnings {
                println!("warning: {}", warning);
            }

            let pre = service.import_sheet(allocation.id, &parsed, actor)?;

            println!(
                "Imported PRE {} for '{}': {} line items ({} custom), grand total {}.",
                pre.id,
                pre.department,
                pre.line_items.len(),
                parsed.custom_item_count(),
                pre.total_amount
            );
            println!(
                "Review the draft with 'fundwatch pre show {}', then submit it.",
                pre.id
            );
        }

        PreCommands::Draft {
            allocation,
            budget,
            program,
            fund_source,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;
            let pre = service.create_draft(allocation.id, program, fund_source, actor)?;

            println!("Created draft PRE {} for '{}'.", pre.id, pre.department);
            println!("Add line items with 'fundwatch pre add-item {} ...'.", pre.id);
        }

        PreCommands::AddItem {
            pre,
            section,
            name,
            q1,
            q2,
            q3,
            q4,
            subcategory,
        } => {
            let pre = service.resolve(&pre)?;
            let quarters = QuarterAmounts::new(
                parse_money(&q1)?,
                parse_money(&q2)?,
                parse_money(&q3)?,
                parse_money(&q4)?,
            );

            let updated =
                service.add_line_item(pre.id, section, &subcategory, &name, quarters, actor)?;

            println!(
                "Added '{}' to PRE {}; grand total is now {}.",
                name, updated.id, updated.total_amount
            );
        }

        PreCommands::List { allocation, budget } => {
            let allocation_id = match allocation {
                Some(reference) => {
                    Some(resolve_allocation(storage, &reference, budget.as_deref())?.id)
                }
                None => None,
            };
            let pres = service.list(allocation_id)?;
            println!("{}", display::format_pre_list(&pres));
        }

        PreCommands::Show { pre } => {
            let pre = service.resolve(&pre)?;
            println!("{}", display::format_pre_detail(&pre));
        }

        PreCommands::Submit { pre } => {
            let pre = service.resolve(&pre)?;
            let pre = service.submit(pre.id, actor)?;
            println!("PRE {} submitted for review ({}).", pre.id, pre.total_amount);
        }

        PreCommands::Review { pre, notes } => {
            let pre = service.resolve(&pre)?;
            let pre = service.partial_approve(pre.id, &notes, actor)?;
            println!(
                "PRE {} partially approved; print it for signing, then countersign.",
                pre.id
            );
        }

        PreCommands::Countersign { pre } => {
            let pre = service.resolve(&pre)?;
            let pre = service.countersign(pre.id, actor)?;
            println!("PRE {} is awaiting final verification.", pre.id);
        }

        PreCommands::Finalize { pre } => {
            let pre = service.resolve(&pre)?;
            let pre = service.finalize(pre.id, actor)?;
            println!(
                "PRE {} approved. Grand total {} recorded against the allocation.",
                pre.id, pre.total_amount
            );
        }

        PreCommands::Reject { pre, reason } => {
            let pre = service.resolve(&pre)?;
            let pre = service.reject(pre.id, &reason, actor)?;
            println!("PRE {} rejected: {}", pre.id, pre.rejection_reason);
        }

        PreCommands::Quarters { pre } => {
            let pre = service.resolve(&pre)?;
            let report = QuarterlyReport::build(storage, pre.id)?;
            println!("{}", display::format_quarterly(&report));
        }
    }

    Ok(())
}
