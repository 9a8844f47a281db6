//! Purchase request CLI commands

use clap::Subcommand;

use crate::display;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{PurchaseItem, Quarter};
use crate::services::{PreService, PurchaseRequestService};
use crate::storage::Storage;

use super::{parse_money, resolve_allocation};

/// Purchase request subcommands
#[derive(Subcommand)]
pub enum PrCommands {
    /// Create a draft purchase request
    Create {
        /// Document number (e.g. "PR-2025-0001")
        number: String,
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Purpose of the procurement
        purpose: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Add a costed item row to a draft
    AddItem {
        /// PR number or id
        pr: String,
        /// Item description
        description: String,
        /// Quantity
        quantity: u32,
        /// Unit cost
        unit_cost: String,
        /// Unit of measure
        #[arg(long, default_value = "unit")]
        unit: String,
        /// Stock/property number
        #[arg(long, default_value = "")]
        stock_no: String,
    },

    /// Fund a draft from an approved PRE line item quarter
    Fund {
        /// PR number or id
        pr: String,
        /// Funding PRE id
        pre: String,
        /// Line item within the PRE (id or name)
        line_item: String,
        /// Quarter to draw from (Q1-Q4)
        quarter: Quarter,
        /// Amount to draw
        amount: String,
        /// Notes on this funding row
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List purchase requests
    List {
        /// Limit to one allocation
        #[arg(long)]
        allocation: Option<String>,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show a purchase request
    Show {
        /// PR number or id
        pr: String,
    },

    /// Submit a draft for review
    Submit {
        /// PR number or id
        pr: String,
    },

    /// Partially approve a pending request
    Review {
        /// PR number or id
        pr: String,
        /// Reviewer notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Record that signed documents came back
    Countersign {
        /// PR number or id
        pr: String,
    },

    /// Final approval: deduct the total from the allocation
    Finalize {
        /// PR number or id
        pr: String,
    },

    /// Reject a request under review
    Reject {
        /// PR number or id
        pr: String,
        /// Rejection reason
        reason: String,
    },
}

/// Handle a purchase request command
pub fn handle_pr_command(storage: &Storage, actor: &str, cmd: PrCommands) -> FundwatchResult<()> {
    let service = PurchaseRequestService::new(storage);

    match cmd {
        PrCommands::Create {
            number,
            allocation,
            purpose,
            budget,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;
            let pr = service.create(&number, allocation.id, &purpose, actor)?;

            println!("Created draft {} for '{}'.", pr.pr_number, pr.department);
            println!("Add items and funding, then submit.");
        }

        PrCommands::AddItem {
            pr,
            description,
            quantity,
            unit_cost,
            unit,
            stock_no,
        } => {
            let pr = service.resolve(&pr)?;
            let item = PurchaseItem {
                stock_no,
                unit,
                description,
                quantity,
                unit_cost: parse_money(&unit_cost)?,
            };

            let updated = service.add_item(pr.id, item, actor)?;
            println!(
                "Added item to {}; item total is now {}.",
                updated.pr_number,
                updated.item_total()
            );
        }

        PrCommands::Fund {
            pr,
            pre,
            line_item,
            quarter,
            amount,
            notes,
        } => {
            let pr = service.resolve(&pr)?;
            let pre = PreService::new(storage).resolve(&pre)?;
            let item = pre
                .find_line_item(&line_item)
                .ok_or_else(|| FundwatchError::line_item_not_found(&line_item))?;
            let amount = parse_money(&amount)?;

            let updated = service.fund(pr.id, pre.id, item.id, quarter, amount, &notes, actor)?;
            println!(
                "Funded {} with {} from {} of '{}'.",
                updated.pr_number, amount, quarter, item.name
            );
            println!("Funding total: {}", updated.funding_total());
        }

        PrCommands::List { allocation, budget } => {
            let allocation_id = match allocation {
                Some(reference) => {
                    Some(resolve_allocation(storage, &reference, budget.as_deref())?.id)
                }
                None => None,
            };
            let purchase_requests = service.list(allocation_id)?;
            println!("{}", display::format_pr_list(&purchase_requests));
        }

        PrCommands::Show { pr } => {
            let pr = service.resolve(&pr)?;
            println!("{}", display::format_pr_detail(&pr));
        }

        PrCommands::Submit { pr } => {
            let pr = service.resolve(&pr)?;
            let pr = service.submit(pr.id, actor)?;
            println!("{} submitted for review ({}).", pr.pr_number, pr.total_amount());
        }

        PrCommands::Review { pr, notes } => {
            let pr = service.resolve(&pr)?;
            let pr = service.partial_approve(pr.id, &notes, actor)?;
            println!(
                "{} partially approved; print it for signing, then countersign.",
                pr.pr_number
            );
        }

        PrCommands::Countersign { pr } => {
            let pr = service.resolve(&pr)?;
            let pr = service.countersign(pr.id, actor)?;
            println!("{} is awaiting final verification.", pr.pr_number);
        }

        PrCommands::Finalize { pr } => {
            let pr = service.resolve(&pr)?;
            let pr = service.finalize(pr.id, actor)?;
            println!(
                "{} approved; {} deducted from the allocation.",
                pr.pr_number,
                pr.total_amount()
            );
        }

        PrCommands::Reject { pr, reason } => {
            let pr = service.resolve(&pr)?;
            let pr = service.reject(pr.id, &reason, actor)?;
            println!("{} rejected: {}", pr.pr_number, pr.rejection_reason);
        }
    }

    Ok(())
}
