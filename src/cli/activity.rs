//! Activity design CLI commands

use clap::Subcommand;

use crate::display;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::Quarter;
use crate::services::{ActivityDesignService, PreService};
use crate::storage::Storage;

use super::{parse_money, resolve_allocation};

/// Activity design subcommands
#[derive(Subcommand)]
pub enum AdCommands {
    /// Create a draft activity design
    Create {
        /// Document number (e.g. "AD-2025-0001")
        number: String,
        /// Allocation id, or department name with --budget
        allocation: String,
        /// Activity title
        title: String,
        /// Total amount requested
        amount: String,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Fund a draft from an approved PRE line item quarter
    Fund {
        /// AD number or id
        ad: String,
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

    /// List activity designs
    List {
        /// Limit to one allocation
        #[arg(long)]
        allocation: Option<String>,
        /// Budget context for department lookups
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show an activity design
    Show {
        /// AD number or id
        ad: String,
    },

    /// Submit a draft for review
    Submit {
        /// AD number or id
        ad: String,
    },

    /// Partially approve a pending activity design
    Review {
        /// AD number or id
        ad: String,
        /// Reviewer notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Record that signed documents came back
    Countersign {
        /// AD number or id
        ad: String,
    },

    /// Final approval: deduct the total from the allocation
    Finalize {
        /// AD number or id
        ad: String,
    },

    /// Reject an activity design under review
    Reject {
        /// AD number or id
        ad: String,
        /// Rejection reason
        reason: String,
    },
}

/// Handle an activity design command
pub fn handle_ad_command(storage: &Storage, actor: &str, cmd: AdCommands) -> FundwatchResult<()> {
    let service = ActivityDesignService::new(storage);

    match cmd {
        AdCommands::Create {
            number,
            allocation,
            title,
            amount,
            budget,
        } => {
            let allocation = resolve_allocation(storage, &allocation, budget.as_deref())?;
            let amount = parse_money(&amount)?;

            let ad = service.create(&number, allocation.id, &title, amount, actor)?;

            println!(
                "Created draft {} ('{}') for '{}', total {}.",
                ad.ad_number, ad.activity_title, ad.department, ad.total_amount
            );
        }

        AdCommands::Fund {
            ad,
            pre,
            line_item,
            quarter,
            amount,
            notes,
        } => {
            let ad = service.resolve(&ad)?;
            let pre = PreService::new(storage).resolve(&pre)?;
            let item = pre
                .find_line_item(&line_item)
                .ok_or_else(|| FundwatchError::line_item_not_found(&line_item))?;
            let amount = parse_money(&amount)?;

            let updated = service.fund(ad.id, pre.id, item.id, quarter, amount, &notes, actor)?;
            println!(
                "Funded {} with {} from {} of '{}'.",
                updated.ad_number, amount, quarter, item.name
            );
            println!("Funding total: {} of {}", updated.funding_total(), updated.total_amount);
        }

        AdCommands::List { allocation, budget } => {
            let allocation_id = match allocation {
                Some(reference) => {
                    Some(resolve_allocation(storage, &reference, budget.as_deref())?.id)
                }
                None => None,
            };
            let activity_designs = service.list(allocation_id)?;
            println!("{}", display::format_ad_list(&activity_designs));
        }

        AdCommands::Show { ad } => {
            let ad = service.resolve(&ad)?;
            println!("{} - {}", ad.ad_number, ad.activity_title);
            println!("  Department: {}", ad.department);
            println!("  Status:     {}", ad.status);
            println!("  Total:      {}", ad.total_amount);
            if !ad.purpose.is_empty() {
                println!("  Purpose:    {}", ad.purpose);
            }
            if !ad.rejection_reason.is_empty() {
                println!("  Rejected:   {}", ad.rejection_reason);
            }
            if !ad.fundings.is_empty() {
                println!("\nFunding sources:");
                for funding in &ad.fundings {
                    println!(
                        "  {} {} from line {} (PRE {})",
                        funding.quarter, funding.amount, funding.line_item_id, funding.pre_id
                    );
                }
            }
        }

        AdCommands::Submit { ad } => {
            let ad = service.resolve(&ad)?;
            let ad = service.submit(ad.id, actor)?;
            println!("{} submitted for review ({}).", ad.ad_number, ad.total_amount);
        }

        AdCommands::Review { ad, notes } => {
            let ad = service.resolve(&ad)?;
            let ad = service.partial_approve(ad.id, &notes, actor)?;
            println!(
                "{} partially approved; print it for signing, then countersign.",
                ad.ad_number
            );
        }

        AdCommands::Countersign { ad } => {
            let ad = service.resolve(&ad)?;
            let ad = service.countersign(ad.id, actor)?;
            println!("{} is awaiting final verification.", ad.ad_number);
        }

        AdCommands::Finalize { ad } => {
            let ad = service.resolve(&ad)?;
            let ad = service.finalize(ad.id, actor)?;
            println!(
                "{} approved; {} deducted from the allocation.",
                ad.ad_number, ad.total_amount
            );
        }

        AdCommands::Reject { ad, reason } => {
            let ad = service.resolve(&ad)?;
            let ad = service.reject(ad.id, &reason, actor)?;
            println!("{} rejected: {}", ad.ad_number, ad.rejection_reason);
        }
    }

    Ok(())
}
