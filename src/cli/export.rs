//! Export CLI commands

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{FundwatchError, FundwatchResult};
use crate::export::{
    export_budgets_csv, export_departments_csv, export_json, export_ledger_csv,
    export_utilization_csv, export_yaml, ExportFormat,
};
use crate::models::FiscalYear;
use crate::reports::{DashboardReport, UtilizationReport};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the utilization report
    Utilization {
        /// Output format: csv, json, or yaml
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// Limit to one fiscal year
        #[arg(long)]
        fiscal_year: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the dashboard report
    Dashboard {
        /// Output format: csv, json, or yaml
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Limit to one fiscal year
        #[arg(long)]
        fiscal_year: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the balance ledger
    Ledger {
        /// Output format: csv, json, or yaml
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export all budgets
    Budgets {
        /// Output format: csv, json, or yaml
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExportCommands,
) -> FundwatchResult<()> {
    match cmd {
        ExportCommands::Utilization {
            format,
            fiscal_year,
            output,
        } => {
            let fiscal_year = parse_fiscal_year(fiscal_year.as_deref())?;
            let report = UtilizationReport::build(storage, fiscal_year.as_ref())?;

            let mut writer = open_output(output.as_deref())?;
            match format {
                ExportFormat::Csv => export_utilization_csv(&report, &mut writer)?,
                ExportFormat::Json => export_json(&report, &mut writer)?,
                ExportFormat::Yaml => export_yaml(&report, &mut writer)?,
            }
            finish(output.as_deref(), "utilization report")?;
        }

        ExportCommands::Dashboard {
            format,
            fiscal_year,
            output,
        } => {
            let fiscal_year = parse_fiscal_year(fiscal_year.as_deref())?;
            let report = DashboardReport::build(
                storage,
                fiscal_year.as_ref(),
                settings.low_balance_threshold_percent,
            )?;

            let mut writer = open_output(output.as_deref())?;
            match format {
                ExportFormat::Csv => export_departments_csv(&report.departments, &mut writer)?,
                ExportFormat::Json => export_json(&report, &mut writer)?,
                ExportFormat::Yaml => export_yaml(&report, &mut writer)?,
            }
            finish(output.as_deref(), "dashboard report")?;
        }

        ExportCommands::Ledger { format, output } => {
            let entries = storage.ledger.get_all()?;

            let mut writer = open_output(output.as_deref())?;
            match format {
                ExportFormat::Csv => export_ledger_csv(&entries, &mut writer)?,
                ExportFormat::Json => export_json(&entries, &mut writer)?,
                ExportFormat::Yaml => export_yaml(&entries, &mut writer)?,
            }
            finish(output.as_deref(), "ledger")?;
        }

        ExportCommands::Budgets { format, output } => {
            let budgets = storage.budgets.get_all()?;

            let mut writer = open_output(output.as_deref())?;
            match format {
                ExportFormat::Csv => export_budgets_csv(&budgets, &mut writer)?,
                ExportFormat::Json => export_json(&budgets, &mut writer)?,
                ExportFormat::Yaml => export_yaml(&budgets, &mut writer)?,
            }
            finish(output.as_deref(), "budgets")?;
        }
    }

    Ok(())
}

fn open_output(path: Option<&std::path::Path>) -> FundwatchResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                FundwatchError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn finish(path: Option<&std::path::Path>, what: &str) -> FundwatchResult<()> {
    if let Some(path) = path {
        println!("Exported {} to {}.", what, path.display());
    }
    Ok(())
}

fn parse_fiscal_year(value: Option<&str>) -> FundwatchResult<Option<FiscalYear>> {
    value
        .map(|s| FiscalYear::parse(s).map_err(|e| FundwatchError::Validation(e.to_string())))
        .transpose()
}
