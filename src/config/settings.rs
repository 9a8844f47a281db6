//! User settings for fundwatch
//!
//! Manages preferences for the budget office: currency display, alert
//! thresholds, and the default actor recorded in audit entries.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::paths::FundwatchPaths;
use crate::error::FundwatchError;

/// User settings for fundwatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used in displays
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Departments whose remaining balance drops below this percentage are
    /// flagged on the dashboard
    #[serde(default = "default_low_balance_threshold")]
    pub low_balance_threshold_percent: u8,

    /// Default actor name for audit entries when --actor is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_actor: Option<String>,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Whether initial setup has been completed
    #[serde(default)]
    pub setup_completed: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₱".to_string()
}

fn default_low_balance_threshold() -> u8 {
    10
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            low_balance_threshold_percent: default_low_balance_threshold(),
            default_actor: None,
            date_format: default_date_format(),
            setup_completed: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, creating defaults if the file doesn't exist
    pub fn load_or_create(paths: &FundwatchPaths) -> Result<Self, FundwatchError> {
        let path = paths.settings_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(&path).map_err(|e| {
            FundwatchError::Config(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            FundwatchError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FundwatchPaths) -> Result<(), FundwatchError> {
        paths.ensure_directories()?;

        let path = paths.settings_file();
        let file = File::create(&path).map_err(|e| {
            FundwatchError::Config(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| FundwatchError::Config(format!("Failed to write settings: {}", e)))?;
        writer
            .flush()
            .map_err(|e| FundwatchError::Config(format!("Failed to flush settings: {}", e)))?;

        Ok(())
    }

    /// Resolve the actor for a command: explicit flag, then settings, then $USER
    pub fn resolve_actor(&self, flag: Option<&str>) -> String {
        if let Some(actor) = flag {
            return actor.to_string();
        }
        if let Some(actor) = &self.default_actor {
            return actor.clone();
        }
        std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
    }
}
