//! Report CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display;
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::FiscalYear;
use crate::reports::{DashboardReport, QuarterlyReport, UtilizationReport};
use crate::services::PreService;
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Budget office dashboard
    Dashboard {
        /// Limit to one fiscal year
        #[arg(long)]
        fiscal_year: Option<String>,
    },

    /// Department utilization table
    Utilization {
        /// Limit to one fiscal year
        #[arg(long)]
        fiscal_year: Option<String>,
    },

    /// Quarterly consumption breakdown for a PRE
    Quarterly {
        /// PRE id
        pre: String,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> FundwatchResult<()> {
    match cmd {
        ReportCommands::Dashboard { fiscal_year } => {
            let fiscal_year = parse_fiscal_year(fiscal_year.as_deref())?;
            let report = DashboardReport::build(
                storage,
                fiscal_year.as_ref(),
                settings.low_balance_threshold_percent,
            )?;
            println!("{}", display::format_dashboard(&report));
        }

        ReportCommands::Utilization { fiscal_year } => {
            let fiscal_year = parse_fiscal_year(fiscal_year.as_deref())?;
            let report = UtilizationReport::build(storage, fiscal_year.as_ref())?;
            println!("{}", display::format_utilization(&report));
        }

        ReportCommands::Quarterly { pre } => {
            let pre = PreService::new(storage).resolve(&pre)?;
            let report = QuarterlyReport::build(storage, pre.id)?;
            println!("{}", display::format_quarterly(&report));
        }
    }

    Ok(())
}

fn parse_fiscal_year(value: Option<&str>) -> FundwatchResult<Option<FiscalYear>> {
    value
        .map(|s| FiscalYear::parse(s).map_err(|e| FundwatchError::Validation(e.to_string())))
        .transpose()
}
