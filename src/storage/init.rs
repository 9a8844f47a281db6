//! Storage initialization
//!
//! Creates the directory layout and empty data files for a fresh install.

use crate::config::paths::FundwatchPaths;
use crate::error::FundwatchError;

use super::Storage;

/// Initialize storage for first use
///
/// Creates directories and writes empty (but valid) data files so later
/// loads never hit missing-file paths.
pub fn initialize_storage(paths: &FundwatchPaths) -> Result<(), FundwatchError> {
    paths.ensure_directories()?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    storage.save_all()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_data_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();

        assert!(paths.budgets_file().exists());
        assert!(paths.allocations_file().exists());
        assert!(paths.pres_file().exists());
        assert!(paths.purchase_requests_file().exists());
        assert!(paths.activity_designs_file().exists());
        assert!(paths.realignments_file().exists());
        assert!(paths.ledger_file().exists());
        assert!(paths.savings_file().exists());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FundwatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        initialize_storage(&paths).unwrap();

        assert!(paths.budgets_file().exists());
    }
}
