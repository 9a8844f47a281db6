//! Path management for fundwatch
//!
//! Provides platform-appropriate path resolution for configuration and data.
//!
//! ## Path Resolution Order
//!
//! 1. `FUNDWATCH_DATA_DIR` environment variable (if set)
//! 2. Platform config directory via `directories` (e.g. `~/.config/fundwatch`)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::FundwatchError;

/// Manages all paths used by fundwatch
#[derive(Debug, Clone)]
pub struct FundwatchPaths {
    /// Base directory for all fundwatch data
    base_dir: PathBuf,
}

impl FundwatchPaths {
    /// Create a new FundwatchPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, FundwatchError> {
        let base_dir = if let Ok(custom) = std::env::var("FUNDWATCH_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "fundwatch")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    FundwatchError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create FundwatchPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config directory (same as base for simplicity)
    pub fn config_dir(&self) -> PathBuf {
        self.base_dir.clone()
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to budgets.json
    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    /// Get the path to allocations.json
    pub fn allocations_file(&self) -> PathBuf {
        self.data_dir().join("allocations.json")
    }

    /// Get the path to pres.json
    pub fn pres_file(&self) -> PathBuf {
        self.data_dir().join("pres.json")
    }

    /// Get the path to purchase_requests.json
    pub fn purchase_requests_file(&self) -> PathBuf {
        self.data_dir().join("purchase_requests.json")
    }

    /// Get the path to activity_designs.json
    pub fn activity_designs_file(&self) -> PathBuf {
        self.data_dir().join("activity_designs.json")
    }

    /// Get the path to realignments.json
    pub fn realignments_file(&self) -> PathBuf {
        self.data_dir().join("realignments.json")
    }

    /// Get the path to ledger.json
    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir().join("ledger.json")
    }

    /// Get the path to savings.json
    pub fn savings_file(&self) -> PathBuf {
        self.data_dir().join("savings.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), FundwatchError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| FundwatchError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| FundwatchError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if fundwatch has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.budgets_file(),
            temp_dir.path().join("data").join("budgets.json")
        );
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }
}
