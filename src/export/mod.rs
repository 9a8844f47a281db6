//! Export layer for fundwatch
//!
//! Writes reports and raw records out as CSV, JSON, or YAML.

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::{
    export_budgets_csv, export_departments_csv, export_ledger_csv, export_utilization_csv,
};
pub use json::export_json;
pub use yaml::export_yaml;

use std::fmt;
use std::str::FromStr;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(format!(
                "Unknown export format '{}' (expected csv, json, or yaml)",
                other
            )),
        }
    }
}
