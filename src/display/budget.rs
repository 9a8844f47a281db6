//! Budget and allocation display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Allocation, ApprovedBudget};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Fiscal Year")]
    fiscal_year: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Unallocated")]
    remaining: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a table of budgets
pub fn format_budget_list(budgets: &[ApprovedBudget]) -> String {
    if budgets.is_empty() {
        return "No budgets on record.\n\nRun 'fundwatch budget add' to record one.".to_string();
    }

    let rows: Vec<BudgetRow> = budgets
        .iter()
        .map(|b| BudgetRow {
            fiscal_year: b.fiscal_year.to_string(),
            title: b.title.clone(),
            amount: b.amount.to_string(),
            remaining: b.remaining.to_string(),
            status: if b.archive.is_archived() {
                "archived".to_string()
            } else {
                "active".to_string()
            },
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a budget with its allocations
pub fn format_budget_detail(budget: &ApprovedBudget, allocations: &[Allocation]) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} ({})\n", budget.title, budget.fiscal_year));
    output.push_str(&format!("  ID:          {}\n", budget.id));
    output.push_str(&format!("  Amount:      {}\n", budget.amount));
    output.push_str(&format!("  Unallocated: {}\n", budget.remaining));
    if !budget.description.is_empty() {
        output.push_str(&format!("  Notes:       {}\n", budget.description));
    }
    output.push_str(&format!(
        "  Recorded by {} on {}\n",
        budget.created_by,
        budget.created_at.format("%Y-%m-%d")
    ));

    if allocations.is_empty() {
        output.push_str("\nNo department allocations yet.\n");
    } else {
        output.push('\n');
        output.push_str(&format_allocation_list(allocations));
        output.push('\n');
    }

    output
}

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Allocated")]
    allocated: String,
    #[tabled(rename = "PRE Total")]
    pre_used: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Used %")]
    utilization: String,
}

/// Format a table of allocations
pub fn format_allocation_list(allocations: &[Allocation]) -> String {
    if allocations.is_empty() {
        return "No allocations on record.".to_string();
    }

    let rows: Vec<AllocationRow> = allocations
        .iter()
        .map(|a| AllocationRow {
            department: a.department.clone(),
            allocated: a.allocated.to_string(),
            pre_used: a.pre_used.to_string(),
            spent: a.total_used().to_string(),
            remaining: a.remaining_balance().to_string(),
            utilization: format!("{:.1}%", a.utilization_percent()),
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}
