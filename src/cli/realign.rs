//! Realignment CLI commands

use clap::Subcommand;

use crate::display;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::QuarterAmounts;
use crate::services::{PreService, RealignmentService};
use crate::storage::Storage;

use super::parse_money;

/// Realignment subcommands
#[derive(Subcommand)]
pub enum RealignCommands {
    /// Request moving budget between PRE line items
    Request {
        /// Source PRE id
        source_pre: String,
        /// Source line item (id or name)
        source_item: String,
        /// Target PRE id
        target_pre: String,
        /// Target line item (id or name)
        target_item: String,
        /// Q1 amount to move
        #[arg(long, default_value = "0")]
        q1: String,
        /// Q2 amount to move
        #[arg(long, default_value = "0")]
        q2: String,
        /// Q3 amount to move
        #[arg(long, default_value = "0")]
        q3: String,
        /// Q4 amount to move
        #[arg(long, default_value = "0")]
        q4: String,
        /// Reason for the realignment
        #[arg(short, long, default_value = "")]
        reason: String,
    },

    /// List realignments
    List,

    /// Show a realignment
    Show {
        /// Realignment id
        id: String,
    },

    /// Partially approve a pending realignment
    Review {
        /// Realignment id
        id: String,
        /// Reviewer notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Record that signed documents came back
    Countersign {
        /// Realignment id
        id: String,
    },

    /// Final approval: execute the transfer
    Finalize {
        /// Realignment id
        id: String,
    },

    /// Reject a realignment under review
    Reject {
        /// Realignment id
        id: String,
        /// Rejection reason
        reason: String,
    },
}

/// Handle a realignment command
pub fn handle_realign_command(
    storage: &Storage,
    actor: &str,
    cmd: RealignCommands,
) -> FundwatchResult<()> {
    let service = RealignmentService::new(storage);

    match cmd {
        RealignCommands::Request {
            source_pre,
            source_item,
            target_pre,
            target_item,
            q1,
            q2,
            q3,
            q4,
            reason,
        } => {
            let pre_service = PreService::new(storage);
            let source_pre = pre_service.resolve(&source_pre)?;
            let target_pre = pre_service.resolve(&target_pre)?;
            let source_item = source_pre
                .find_line_item(&source_item)
                .ok_or_else(|| FundwatchError::line_item_not_found(&source_item))?;
            let target_item = target_pre
                .find_line_item(&target_item)
                .ok_or_else(|| FundwatchError::line_item_not_found(&target_item))?;

            let quarters = QuarterAmounts::new(
                parse_money(&q1)?,
                parse_money(&q2)?,
                parse_money(&q3)?,
                parse_money(&q4)?,
            );

            let realignment = service.request(
                source_pre.id,
                source_item.id,
                target_pre.id,
                target_item.id,
                quarters,
                &reason,
                actor,
            )?;

            println!(
                "Filed realignment {} moving {} from '{}' to '{}' (pending review).",
                realignment.id,
                realignment.total_amount(),
                source_item.name,
                target_item.name
            );
        }

        RealignCommands::List => {
            let realignments = service.list()?;
            println!("{}", display::format_realignment_list(&realignments));
        }

        RealignCommands::Show { id } => {
            let realignment = service.resolve(&id)?;
            println!("{}", realignment);
            println!(
                "  Source: line {} of PRE {}",
                realignment.source_line_item, realignment.source_pre
            );
            println!(
                "  Target: line {} of PRE {}",
                realignment.target_line_item, realignment.target_pre
            );
            for (quarter, amount) in realignment.quarters.nonzero() {
                println!("  {}: {}", quarter, amount);
            }
            if !realignment.reason.is_empty() {
                println!("  Reason: {}", realignment.reason);
            }
            if !realignment.rejection_reason.is_empty() {
                println!("  Rejected: {}", realignment.rejection_reason);
            }
        }

        RealignCommands::Review { id, notes } => {
            let realignment = service.resolve(&id)?;
            let realignment = service.partial_approve(realignment.id, &notes, actor)?;
            println!(
                "Realignment {} partially approved; print it for signing, then countersign.",
                realignment.id
            );
        }

        RealignCommands::Countersign { id } => {
            let realignment = service.resolve(&id)?;
            let realignment = service.countersign(realignment.id, actor)?;
            println!("Realignment {} is awaiting final verification.", realignment.id);
        }

        RealignCommands::Finalize { id } => {
            let realignment = service.resolve(&id)?;
            let realignment = service.finalize(realignment.id, actor)?;
            println!(
                "Realignment {} executed; {} moved between line items.",
                realignment.id,
                realignment.total_amount()
            );
        }

        RealignCommands::Reject { id, reason } => {
            let realignment = service.resolve(&id)?;
            let realignment = service.reject(realignment.id, &reason, actor)?;
            println!(
                "Realignment {} rejected: {}",
                realignment.id, realignment.rejection_reason
            );
        }
    }

    Ok(())
}
