//! PRE sheet parser
//!
//! Departments fill out a standard PRE spreadsheet template and hand in a CSV
//! export of it. The layout: item names in the first three columns, quarterly
//! amounts in columns E-H, the row total in column I. Section marker rows
//! (RECEIPTS, PERSONNEL SERVICES, MOOE, CAPITAL OUTLAYS) divide the sheet,
//! subcategory header rows carry a name but no amounts, and a GRAND TOTAL row
//! closes the sheet.
//!
//! The parser is deliberately forgiving: placeholder cells ("XXX", "-") read
//! as zero, broken formulas produce warnings rather than failures, and custom
//! rows the department added are flagged rather than dropped.

use std::io::Read;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{FundwatchError, FundwatchResult};
use crate::models::pre::Section;
use crate::models::{FiscalYear, Money, QuarterAmounts};

/// Column layout of the exported template
const NAME_COLUMNS: std::ops::RangeInclusive<usize> = 0..=2;
const QUARTER_COLUMNS: [usize; 4] = [4, 5, 6, 7];
const TOTAL_COLUMN: usize = 8;

/// Row totals may disagree with the quarter sum by at most one centavo
/// before a mismatch is recorded
const ROW_TOTAL_TOLERANCE: Money = Money::from_centavos(1);

/// Row name fragments that mark section totals and headers, never data
const SKIP_PATTERNS: &[&str] = &[
    "TOTAL",
    "SUB-TOTAL",
    "RECEIPTS / BUDGET",
    "BUDGET BY OBJECT",
    "CURRENT OPERATING",
];

/// Items present in the standard template; anything else is a custom row
const STANDARD_ITEMS: &[&str] = &[
    "GASS - TUITION FEE",
    "Basic Salary",
    "Honoraria",
    "Overtime Pay",
    "Travelling expenses-local",
    "Travelling Expenses-foreign",
    "Training Expenses",
    "Office Supplies Expenses",
    "Accountable Form Expenses",
    "Agricultural and Marine Supplies expenses",
    "Drugs and Medicines",
    "Laboratory Supplies expenses",
    "Textbooks and instructional materials",
    "Fuel, Oil and Lubricants",
    "Water Expenses",
    "Electricity Expenses",
    "Postage and Courier Services",
    "Telephone/Mobile Expenses",
    "Internet Subscription Expenses",
    "Repairs and Maintenance",
    "Representation Expenses",
    "Subscription Expenses",
    "Office Equipment",
    "ICT Equipment",
    "Furniture and Fixtures",
];

/// A parsed expenditure row
#[derive(Debug, Clone)]
pub struct ParsedLineItem {
    pub section: Section,
    pub subcategory: String,
    pub name: String,
    pub quarters: QuarterAmounts,
    pub is_custom: bool,
    pub row: usize,
}

/// A parsed receipts (income) row
#[derive(Debug, Clone)]
pub struct ParsedReceipt {
    pub name: String,
    pub quarters: QuarterAmounts,
}

/// A row whose stated total disagrees with its quarter sum
#[derive(Debug, Clone)]
pub struct RowMismatch {
    pub row: usize,
    pub item: String,
    pub computed: Money,
    pub stated: Money,
}

/// The full result of parsing a PRE sheet
#[derive(Debug, Clone, Default)]
pub struct ParsedPreSheet {
    pub fiscal_year: Option<FiscalYear>,
    pub receipts: Vec<ParsedReceipt>,
    pub line_items: Vec<ParsedLineItem>,
    pub grand_total: Money,
    pub warnings: Vec<String>,
    pub mismatches: Vec<RowMismatch>,
}

impl ParsedPreSheet {
    /// Count of rows the department added beyond the template
    pub fn custom_item_count(&self) -> usize {
        self.line_items.iter().filter(|i| i.is_custom).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Preamble,
    Receipts,
    Expenditure(Section),
    Done,
}

/// Parse a PRE sheet from CSV
pub fn parse_pre_sheet<R: Read>(reader: R) -> FundwatchResult<ParsedPreSheet> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedPreSheet::default();
    let mut region = Region::Preamble;
    let mut subcategory = String::new();
    let mut stated_grand_total: Option<Money> = None;

    for (index, record) in csv_reader.records().enumerate() {
        let row = index + 1;
        let record = record
            .map_err(|e| FundwatchError::Import(format!("Failed to read sheet row {}: {}", row, e)))?;

        let name = NAME_COLUMNS
            .clone()
            .filter_map(|col| record.get(col))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or("")
            .to_string();

        if region == Region::Preamble && parsed.fiscal_year.is_none() {
            parsed.fiscal_year = extract_fiscal_year(&name);
        }

        // Section markers move the cursor; the marker row itself is never data
        if let Some(marker) = section_marker(&name) {
            if marker == Region::Done {
                stated_grand_total = Some(parse_cell(
                    record.get(TOTAL_COLUMN),
                    row,
                    &mut parsed.warnings,
                ));
                region = Region::Done;
                break;
            }
            region = marker;
            subcategory.clear();
            continue;
        }

        if name.is_empty() || is_skip_row(&name) {
            continue;
        }

        let quarters = read_quarters(&record, row, &mut parsed.warnings);

        match region {
            Region::Preamble | Region::Done => {}
            Region::Receipts => {
                if quarters.is_zero() {
                    continue;
                }
                parsed.receipts.push(ParsedReceipt { name, quarters });
            }
            Region::Expenditure(section) => {
                // A named row without amounts is a subcategory header
                // (MOOE and Capital group their items this way)
                if quarters.is_zero() && record.get(TOTAL_COLUMN).map_or(true, |c| c.trim().is_empty())
                {
                    if matches!(section, Section::Mooe | Section::Capital) {
                        subcategory = name;
                    }
                    continue;
                }
                if quarters.is_zero() {
                    continue;
                }

                validate_row_total(&record, row, &name, quarters, &mut parsed);

                let is_custom = !STANDARD_ITEMS
                    .iter()
                    .any(|standard| standard.eq_ignore_ascii_case(&name));

                parsed.line_items.push(ParsedLineItem {
                    section,
                    subcategory: subcategory.clone(),
                    name,
                    quarters,
                    is_custom,
                    row,
                });
            }
        }
    }

    parsed.grand_total = parsed.line_items.iter().map(|i| i.quarters.total()).sum();

    if let Some(stated) = stated_grand_total {
        if !stated.is_zero() && (parsed.grand_total - stated).abs() > ROW_TOTAL_TOLERANCE {
            parsed.warnings.push(format!(
                "Grand total on the sheet ({}) does not match the computed total ({})",
                stated, parsed.grand_total
            ));
        }
    } else {
        parsed
            .warnings
            .push("No GRAND TOTAL row found in the sheet".to_string());
    }

    if parsed.line_items.is_empty() {
        return Err(FundwatchError::Import(
            "Sheet contains no expenditure line items".into(),
        ));
    }

    debug!(
        items = parsed.line_items.len(),
        custom = parsed.custom_item_count(),
        warnings = parsed.warnings.len(),
        "PRE sheet parsed"
    );

    Ok(parsed)
}

/// Classify a section marker row
fn section_marker(name: &str) -> Option<Region> {
    let upper = name.to_ascii_uppercase();
    if upper.contains("GRAND TOTAL") {
        return Some(Region::Done);
    }
    if upper.starts_with("RECEIPTS") && !upper.contains('/') {
        return Some(Region::Receipts);
    }
    if upper.contains("PERSONNEL SERVICES") {
        return Some(Region::Expenditure(Section::Personnel));
    }
    if upper.contains("MAINTENANCE AND OTHER") || upper == "MOOE" {
        return Some(Region::Expenditure(Section::Mooe));
    }
    if upper.contains("CAPITAL OUTLAY") {
        return Some(Region::Expenditure(Section::Capital));
    }
    None
}

fn is_skip_row(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SKIP_PATTERNS.iter().any(|pattern| upper.contains(pattern))
}

fn read_quarters(record: &csv::StringRecord, row: usize, warnings: &mut Vec<String>) -> QuarterAmounts {
    let values: Vec<Money> = QUARTER_COLUMNS
        .iter()
        .map(|&col| parse_cell(record.get(col), row, warnings))
        .collect();
    QuarterAmounts::new(values[0], values[1], values[2], values[3])
}

/// Parse an amount cell; placeholders and blanks read as zero
fn parse_cell(cell: Option<&str>, row: usize, warnings: &mut Vec<String>) -> Money {
    let value = cell.map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Money::zero();
    }

    let upper = value.to_ascii_uppercase();
    if matches!(upper.as_str(), "XXX" | "XX" | "X" | "XXXX" | "-") {
        return Money::zero();
    }

    match Money::parse(value) {
        Ok(amount) => amount,
        Err(_) => {
            warnings.push(format!(
                "Row {}: invalid cell value '{}' treated as 0",
                row, value
            ));
            Money::zero()
        }
    }
}

/// Record a mismatch when a row's stated total disagrees with its quarters
fn validate_row_total(
    record: &csv::StringRecord,
    row: usize,
    name: &str,
    quarters: QuarterAmounts,
    parsed: &mut ParsedPreSheet,
) {
    let cell = record.get(TOTAL_COLUMN).map(str::trim).unwrap_or("");
    if cell.is_empty() {
        return;
    }
    let stated = parse_cell(Some(cell), row, &mut parsed.warnings);
    if stated.is_zero() {
        return;
    }

    let computed = quarters.total();
    if (computed - stated).abs() > ROW_TOTAL_TOLERANCE {
        parsed.warnings.push(format!(
            "Row {} ({}): stated total {} disagrees with quarter sum {}; using the sum",
            row, name, stated, computed
        ));
        parsed.mismatches.push(RowMismatch {
            row,
            item: name.to_string(),
            computed,
            stated,
        });
    }
}

/// Pull a fiscal year out of a header cell like "FY 2025" or "FY 2025-2026"
fn extract_fiscal_year(name: &str) -> Option<FiscalYear> {
    let trimmed = name.trim();
    let rest = trimmed.strip_prefix("FY")?.trim();
    FiscalYear::parse(rest).ok()
}
