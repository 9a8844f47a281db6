//! JSON export

use std::io::Write;

use serde::Serialize;

use crate::error::{FundwatchError, FundwatchResult};

/// Write any serializable value as pretty-printed JSON
pub fn export_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> FundwatchResult<()> {
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| FundwatchError::Export(format!("Failed to write JSON: {}", e)))?;
    writeln!(writer).map_err(FundwatchError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::reports::{UtilizationReport, UtilizationRow};

    #[test]
    fn test_export_report_json() {
        let report = UtilizationReport {
            fiscal_year: None,
            rows: vec![UtilizationRow {
                department: "Library".into(),
                fiscal_year: "2025".into(),
                allocated: Money::from_pesos(100),
                pr_used: Money::zero(),
                ad_used: Money::zero(),
                remaining: Money::from_pesos(100),
                utilization_percent: 0.0,
            }],
            total_allocated: Money::from_pesos(100),
            total_used: Money::zero(),
        };

        let mut buffer = Vec::new();
        export_json(&report, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("\"department\": \"Library\""));
        assert!(text.ends_with('\n'));
    }
}
