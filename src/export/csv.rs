//! CSV export
//!
//! Amounts are written as plain decimal pesos so spreadsheets treat them as
//! numbers.

use std::io::Write;

use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{ApprovedBudget, LedgerEntry, Money};
use crate::reports::{DepartmentRow, UtilizationReport};

fn money_field(amount: Money) -> String {
    if amount.is_negative() {
        format!("-{}.{:02}", amount.pesos().abs(), amount.centavos_part())
    } else {
        format!("{}.{:02}", amount.pesos(), amount.centavos_part())
    }
}

fn csv_err(e: csv::Error) -> FundwatchError {
    FundwatchError::Export(format!("Failed to write CSV: {}", e))
}

/// Write the utilization report as CSV
pub fn export_utilization_csv<W: Write>(report: &UtilizationReport, writer: W) -> FundwatchResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "department",
            "fiscal_year",
            "allocated",
            "pr_used",
            "ad_used",
            "remaining",
            "utilization_percent",
        ])
        .map_err(csv_err)?;

    for row in &report.rows {
        csv_writer
            .write_record([
                row.department.clone(),
                row.fiscal_year.clone(),
                money_field(row.allocated),
                money_field(row.pr_used),
                money_field(row.ad_used),
                money_field(row.remaining),
                format!("{:.1}", row.utilization_percent),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(FundwatchError::from)?;
    Ok(())
}

/// Write dashboard department rows as CSV
pub fn export_departments_csv<W: Write>(rows: &[DepartmentRow], writer: W) -> FundwatchResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "department",
            "allocated",
            "spent",
            "remaining",
            "utilization_percent",
        ])
        .map_err(csv_err)?;

    for row in rows {
        csv_writer
            .write_record([
                row.department.clone(),
                money_field(row.allocated),
                money_field(row.spent),
                money_field(row.remaining),
                format!("{:.1}", row.utilization_percent),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(FundwatchError::from)?;
    Ok(())
}

/// Write budgets as CSV
pub fn export_budgets_csv<W: Write>(budgets: &[ApprovedBudget], writer: W) -> FundwatchResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "fiscal_year",
            "title",
            "amount",
            "unallocated",
            "created_by",
            "created_at",
            "archived",
        ])
        .map_err(csv_err)?;

    for budget in budgets {
        csv_writer
            .write_record([
                budget.fiscal_year.to_string(),
                budget.title.clone(),
                money_field(budget.amount),
                money_field(budget.remaining),
                budget.created_by.clone(),
                budget.created_at.to_rfc3339(),
                budget.archive.is_archived().to_string(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(FundwatchError::from)?;
    Ok(())
}

/// Write ledger entries as CSV
pub fn export_ledger_csv<W: Write>(entries: &[LedgerEntry], writer: W) -> FundwatchResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "timestamp",
            "allocation_id",
            "kind",
            "amount",
            "previous_balance",
            "new_balance",
            "actor",
            "remarks",
        ])
        .map_err(csv_err)?;

    for entry in entries {
        csv_writer
            .write_record([
                entry.created_at.to_rfc3339(),
                entry.allocation_id.to_string(),
                entry.kind.to_string(),
                money_field(entry.amount),
                money_field(entry.previous_balance),
                money_field(entry.new_balance),
                entry.actor.clone(),
                entry.remarks.clone(),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(FundwatchError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AllocationId, LedgerKind};
    use crate::reports::UtilizationRow;

    #[test]
    fn test_money_field() {
        assert_eq!(money_field(Money::from_centavos(123_456)), "1234.56");
        assert_eq!(money_field(Money::from_centavos(-50)), "-0.50");
        assert_eq!(money_field(Money::zero()), "0.00");
    }

    #[test]
    fn test_utilization_csv() {
        let report = UtilizationReport {
            fiscal_year: Some("2025".into()),
            rows: vec![UtilizationRow {
                department: "Registrar".into(),
                fiscal_year: "2025".into(),
                allocated: Money::from_pesos(1000),
                pr_used: Money::from_pesos(250),
                ad_used: Money::from_pesos(50),
                remaining: Money::from_pesos(700),
                utilization_percent: 30.0,
            }],
            total_allocated: Money::from_pesos(1000),
            total_used: Money::from_pesos(300),
        };

        let mut buffer = Vec::new();
        export_utilization_csv(&report, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("department,fiscal_year,allocated"));
        assert!(text.contains("Registrar,2025,1000.00,250.00,50.00,700.00,30.0"));
    }

    #[test]
    fn test_ledger_csv() {
        let entry = LedgerEntry::new(
            AllocationId::new(),
            LedgerKind::PrApproved,
            -Money::from_pesos(100),
            Money::from_pesos(500),
            Money::from_pesos(400),
            "officer",
            "PR-1",
        );

        let mut buffer = Vec::new();
        export_ledger_csv(&[entry], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("Purchase Request Approved"));
        assert!(text.contains("-100.00,500.00,400.00,officer,PR-1"));
    }
}
