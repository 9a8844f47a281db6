//! Audit log CLI commands

use clap::Subcommand;

use crate::error::FundwatchResult;
use crate::storage::Storage;

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show the most recent audit entries
    Recent {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Show the audit log location and entry count
    Info,
}

/// Handle an audit command
pub fn handle_audit_command(storage: &Storage, cmd: AuditCommands) -> FundwatchResult<()> {
    match cmd {
        AuditCommands::Recent { count } => {
            let entries = storage.audit().read_recent(count)?;
            if entries.is_empty() {
                println!("No audit entries on record.");
            } else {
                for entry in entries {
                    println!("{}", entry.format_human_readable());
                }
            }
        }

        AuditCommands::Info => {
            println!("Audit log: {}", storage.audit().path().display());
            println!("Entries:   {}", storage.audit().entry_count()?);
        }
    }

    Ok(())
}
