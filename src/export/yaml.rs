//! YAML export

use std::io::Write;

use serde::Serialize;

use crate::error::{FundwatchError, FundwatchResult};

/// Write any serializable value as YAML
pub fn export_yaml<T: Serialize, W: Write>(value: &T, writer: W) -> FundwatchResult<()> {
    serde_yaml::to_writer(writer, value)
        .map_err(|e| FundwatchError::Export(format!("Failed to write YAML: {}", e)))
}
