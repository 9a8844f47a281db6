//! Display formatting for PREs, purchase requests, activity designs, and
//! realignments

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::pre::Section;
use crate::models::{ActivityDesign, Pre, PurchaseRequest, Realignment};

#[derive(Tabled)]
struct PreRow {
    #[tabled(rename = "PRE")]
    id: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "FY")]
    fiscal_year: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a table of PREs
pub fn format_pre_list(pres: &[Pre]) -> String {
    if pres.is_empty() {
        return "No PREs on record.".to_string();
    }

    let rows: Vec<PreRow> = pres
        .iter()
        .map(|p| PreRow {
            id: p.id.to_string(),
            department: p.department.clone(),
            fiscal_year: p.fiscal_year.to_string(),
            items: p.line_items.len(),
            total: p.total_amount.to_string(),
            status: p.status.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a PRE with its line items grouped by section
pub fn format_pre_detail(pre: &Pre) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "PRE {} - {} (FY {})\n",
        pre.id, pre.department, pre.fiscal_year
    ));
    output.push_str(&format!("  Status: {}\n", pre.status));
    if let Some(program) = &pre.program {
        output.push_str(&format!("  Program: {}\n", program));
    }
    if let Some(fund_source) = &pre.fund_source {
        output.push_str(&format!("  Fund source: {}\n", fund_source));
    }
    if !pre.rejection_reason.is_empty() {
        output.push_str(&format!("  Rejected: {}\n", pre.rejection_reason));
    }

    if !pre.receipts.is_empty() {
        output.push_str(&format!("\nReceipts ({} rows): {}\n", pre.receipts.len(), pre.receipts_total()));
    }

    for section in Section::all() {
        let items = pre.section_items(section);
        if items.is_empty() {
            continue;
        }
        output.push_str(&format!("\n{}\n", section.label()));
        for item in items {
            let subcategory = if item.subcategory.is_empty() {
                String::new()
            } else {
                format!(" [{}]", item.subcategory)
            };
            output.push_str(&format!(
                "  {:40} {:>14} {:>14} {:>14} {:>14}  = {}{}\n",
                item.name,
                item.quarters.q1.to_string(),
                item.quarters.q2.to_string(),
                item.quarters.q3.to_string(),
                item.quarters.q4.to_string(),
                item.total(),
                subcategory,
            ));
        }
    }

    output.push_str(&format!("\nGrand total: {}\n", pre.total_amount));
    output
}

#[derive(Tabled)]
struct PurchaseRequestRow {
    #[tabled(rename = "PR No.")]
    number: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Purpose")]
    purpose: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a table of purchase requests
pub fn format_pr_list(purchase_requests: &[PurchaseRequest]) -> String {
    if purchase_requests.is_empty() {
        return "No purchase requests on record.".to_string();
    }

    let rows: Vec<PurchaseRequestRow> = purchase_requests
        .iter()
        .map(|p| PurchaseRequestRow {
            number: p.pr_number.clone(),
            department: p.department.clone(),
            purpose: truncate(&p.purpose, 32),
            total: p.total_amount().to_string(),
            status: p.status.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format a purchase request with items and fundings
pub fn format_pr_detail(pr: &PurchaseRequest) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} - {}\n", pr.pr_number, pr.department));
    output.push_str(&format!("  Status:  {}\n", pr.status));
    output.push_str(&format!("  Purpose: {}\n", pr.purpose));
    output.push_str(&format!("  Total:   {}\n", pr.total_amount()));
    if !pr.rejection_reason.is_empty() {
        output.push_str(&format!("  Rejected: {}\n", pr.rejection_reason));
    }

    if !pr.items.is_empty() {
        output.push_str("\nItems:\n");
        for item in &pr.items {
            output.push_str(&format!(
                "  {:40} {:>6} {} @ {} = {}\n",
                truncate(&item.description, 40),
                item.quantity,
                item.unit,
                item.unit_cost,
                item.total_cost()
            ));
        }
    }

    if !pr.fundings.is_empty() {
        output.push_str("\nFunding sources:\n");
        for funding in &pr.fundings {
            output.push_str(&format!(
                "  {} {} from line {} (PRE {})\n",
                funding.quarter, funding.amount, funding.line_item_id, funding.pre_id
            ));
        }
    }

    output
}

#[derive(Tabled)]
struct ActivityDesignRow {
    #[tabled(rename = "AD No.")]
    number: String,
    #[tabled(rename = "Activity")]
    title: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a table of activity designs
pub fn format_ad_list(activity_designs: &[ActivityDesign]) -> String {
    if activity_designs.is_empty() {
        return "No activity designs on record.".to_string();
    }

    let rows: Vec<ActivityDesignRow> = activity_designs
        .iter()
        .map(|a| ActivityDesignRow {
            number: a.ad_number.clone(),
            title: truncate(&a.activity_title, 32),
            department: a.department.clone(),
            total: a.total_amount.to_string(),
            status: a.status.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}

#[derive(Tabled)]
struct RealignmentRow {
    #[tabled(rename = "Realignment")]
    id: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Requested By")]
    requested_by: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a table of realignments
pub fn format_realignment_list(realignments: &[Realignment]) -> String {
    if realignments.is_empty() {
        return "No realignments on record.".to_string();
    }

    let rows: Vec<RealignmentRow> = realignments
        .iter()
        .map(|r| RealignmentRow {
            id: r.id.to_string(),
            total: r.total_amount().to_string(),
            requested_by: r.requested_by.clone(),
            status: r.status.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
