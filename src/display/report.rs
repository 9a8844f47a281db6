//! Display formatting for reports, the ledger, and savings snapshots

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{LedgerEntry, SavingsSnapshot};
use crate::reports::{DashboardReport, QuarterlyReport, UtilizationReport};

/// Format the dashboard report
pub fn format_dashboard(report: &DashboardReport) -> String {
    let mut output = String::new();

    match &report.fiscal_year {
        Some(fy) => output.push_str(&format!("Budget Dashboard - FY {}\n", fy)),
        None => output.push_str("Budget Dashboard - all fiscal years\n"),
    }
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!("Total approved budget: {}\n", report.total_budget));
    output.push_str(&format!("Unallocated:           {}\n", report.total_remaining));
    output.push_str(&format!(
        "Pending documents:     {} (PRE {}, PR {}, AD {})\n",
        report.pending.total(),
        report.pending.pres,
        report.pending.purchase_requests,
        report.pending.activity_designs
    ));
    output.push_str(&format!(
        "Approved documents:    {} (PRE {}, PR {}, AD {})\n",
        report.approved.total(),
        report.approved.pres,
        report.approved.purchase_requests,
        report.approved.activity_designs
    ));

    if !report.departments.is_empty() {
        #[derive(Tabled)]
        struct Row {
            #[tabled(rename = "Department")]
            department: String,
            #[tabled(rename = "Allocated")]
            allocated: String,
            #[tabled(rename = "Spent")]
            spent: String,
            #[tabled(rename = "Remaining")]
            remaining: String,
            #[tabled(rename = "Used %")]
            utilization: String,
        }

        let rows: Vec<Row> = report
            .departments
            .iter()
            .map(|d| Row {
                department: d.department.clone(),
                allocated: d.allocated.to_string(),
                spent: d.spent.to_string(),
                remaining: d.remaining.to_string(),
                utilization: format!("{:.1}%", d.utilization_percent),
            })
            .collect();

        output.push('\n');
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
    }

    output.push_str(&format!(
        "\nAverage utilization: {:.1}%\n",
        report.average_utilization_percent
    ));
    if report.low_balance_departments > 0 {
        output.push_str(&format!(
            "⚠ {} department(s) below the low-balance threshold\n",
            report.low_balance_departments
        ));
    }

    output
}

/// Format the utilization report
pub fn format_utilization(report: &UtilizationReport) -> String {
    if report.rows.is_empty() {
        return "No allocations to report on.".to_string();
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Department")]
        department: String,
        #[tabled(rename = "FY")]
        fiscal_year: String,
        #[tabled(rename = "Allocated")]
        allocated: String,
        #[tabled(rename = "PR Used")]
        pr_used: String,
        #[tabled(rename = "AD Used")]
        ad_used: String,
        #[tabled(rename = "Remaining")]
        remaining: String,
        #[tabled(rename = "Used %")]
        utilization: String,
    }

    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|r| Row {
            department: r.department.clone(),
            fiscal_year: r.fiscal_year.clone(),
            allocated: r.allocated.to_string(),
            pr_used: r.pr_used.to_string(),
            ad_used: r.ad_used.to_string(),
            remaining: r.remaining.to_string(),
            utilization: format!("{:.1}%", r.utilization_percent),
        })
        .collect();

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push_str(&format!(
        "\n\nTotals: {} allocated, {} used\n",
        report.total_allocated, report.total_used
    ));
    output
}

/// Format the quarterly breakdown for a PRE
pub fn format_quarterly(report: &QuarterlyReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Quarterly breakdown - PRE {} ({}, FY {})\n",
        report.pre_id, report.department, report.fiscal_year
    ));

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Line Item")]
        name: String,
        #[tabled(rename = "Qtr")]
        quarter: String,
        #[tabled(rename = "Allocated")]
        allocated: String,
        #[tabled(rename = "Consumed")]
        consumed: String,
        #[tabled(rename = "Reserved")]
        reserved: String,
        #[tabled(rename = "Available")]
        available: String,
        #[tabled(rename = "Docs")]
        docs: String,
    }

    let mut rows = Vec::new();
    for line in &report.lines {
        for cell in &line.quarters {
            rows.push(Row {
                name: line.name.clone(),
                quarter: cell.quarter.clone(),
                allocated: cell.allocated.to_string(),
                consumed: cell.consumed.to_string(),
                reserved: cell.reserved.to_string(),
                available: cell.available.to_string(),
                docs: format!("{} PR / {} AD", cell.pr_count, cell.ad_count),
            });
        }
    }

    output.push('\n');
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push_str(&format!("\n\nGrand total: {}\n", report.grand_total));
    output
}

/// Format recent ledger entries
pub fn format_ledger(entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return "No ledger entries on record.".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!("{}\n", entry));
        if !entry.remarks.is_empty() {
            output.push_str(&format!("    {}\n", entry.remarks));
        }
    }
    output
}

/// Format a savings snapshot with its significant lines
pub fn format_savings(snapshot: &SavingsSnapshot) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Savings snapshot - {} (FY {}, {})\n",
        snapshot.department, snapshot.fiscal_year, snapshot.quarter_label
    ));
    output.push_str(&format!("  Allocated:   {}\n", snapshot.allocated));
    output.push_str(&format!(
        "  Used:        {} (PR {}, AD {})\n",
        snapshot.total_used, snapshot.pr_used, snapshot.ad_used
    ));
    output.push_str(&format!(
        "  Savings:     {} ({:.1}%)\n",
        snapshot.savings,
        snapshot.savings_rate()
    ));
    output.push_str(&format!(
        "  Utilization: {:.1}%\n",
        snapshot.utilization_rate()
    ));

    let significant = snapshot.significant_lines();
    if !significant.is_empty() {
        output.push_str("\nSignificant surpluses:\n");
        for line in significant {
            output.push_str(&format!(
                "  {:40} {:>14}\n",
                line.name,
                line.total_surplus().to_string()
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AllocationId, FiscalYear, LedgerKind, Money};
    use crate::reports::DocCounts;

    #[test]
    fn test_dashboard_formatting() {
        let report = DashboardReport {
            fiscal_year: Some("2025".into()),
            total_budget: Money::from_pesos(1_000_000),
            total_remaining: Money::from_pesos(400_000),
            pending: DocCounts {
                pres: 1,
                purchase_requests: 2,
                activity_designs: 0,
            },
            approved: DocCounts::default(),
            departments: vec![],
            low_balance_departments: 2,
            average_utilization_percent: 55.5,
        };

        let output = format_dashboard(&report);
        assert!(output.contains("FY 2025"));
        assert!(output.contains("₱1,000,000.00"));
        assert!(output.contains("Pending documents:     3"));
        assert!(output.contains("below the low-balance threshold"));
    }

    #[test]
    fn test_ledger_formatting() {
        let entry = LedgerEntry::new(
            AllocationId::new(),
            LedgerKind::AdApproved,
            -Money::from_pesos(50),
            Money::from_pesos(100),
            Money::from_pesos(50),
            "officer",
            "AD-1",
        );
        let output = format_ledger(&[entry]);
        assert!(output.contains("Activity Design Approved"));
        assert!(output.contains("AD-1"));
    }

    #[test]
    fn test_savings_formatting() {
        let snapshot = SavingsSnapshot::new(
            AllocationId::new(),
            FiscalYear::parse("2025").unwrap(),
            "Registrar",
            Money::from_pesos(1000),
            Money::from_pesos(300),
            Money::from_pesos(100),
            "Full Year",
            "bursar",
        );
        let output = format_savings(&snapshot);
        assert!(output.contains("Savings:     ₱600.00 (60.0%)"));
    }
}
