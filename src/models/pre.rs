//! Program of Receipts and Expenditures (PRE)
//!
//! The PRE is a department's annual plan: expected receipts plus categorized
//! expenditure line items with quarterly amounts. Purchase requests and
//! activity designs draw against approved PRE line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::fiscal_year::FiscalYear;
use super::ids::{AllocationId, LineItemId, PreId};
use super::money::Money;
use super::quarter::QuarterAmounts;
use super::status::{RequestStatus, TransitionError};

/// Expenditure section of the PRE template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Section {
    /// Personnel Services
    Personnel,
    /// Maintenance and Other Operating Expenses
    Mooe,
    /// Capital Outlays
    Capital,
}

impl Section {
    pub fn all() -> [Section; 3] {
        [Section::Personnel, Section::Mooe, Section::Capital]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Personnel => "Personnel Services",
            Section::Mooe => "Maintenance and Other Operating Expenses",
            Section::Capital => "Capital Outlays",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personnel" | "ps" => Ok(Section::Personnel),
            "mooe" => Ok(Section::Mooe),
            "capital" | "co" => Ok(Section::Capital),
            other => Err(format!(
                "Unknown section '{}' (expected personnel, mooe, or capital)",
                other
            )),
        }
    }
}

/// Where a line item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemSource {
    /// Present in the standard PRE template
    Template,
    /// Added by the department
    Manual,
}

/// A single expenditure line item with quarterly amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub section: Section,

    /// Subcategory heading from the template (MOOE/Capital only)
    #[serde(default)]
    pub subcategory: String,

    pub name: String,

    #[serde(default = "default_source")]
    pub source: LineItemSource,

    pub quarters: QuarterAmounts,

    #[serde(default)]
    pub remarks: String,
}

fn default_source() -> LineItemSource {
    LineItemSource::Template
}

impl LineItem {
    pub fn new(section: Section, name: impl Into<String>, quarters: QuarterAmounts) -> Self {
        Self {
            id: LineItemId::new(),
            section,
            subcategory: String::new(),
            name: name.into(),
            source: LineItemSource::Template,
            quarters,
            remarks: String::new(),
        }
    }

    /// Total across all quarters
    pub fn total(&self) -> Money {
        self.quarters.total()
    }
}

/// A receipts (income) row; excluded from the expenditure total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_type: String,
    pub quarters: QuarterAmounts,
}

impl Receipt {
    pub fn total(&self) -> Money {
        self.quarters.total()
    }
}

/// A department's Program of Receipts and Expenditures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pre {
    pub id: PreId,
    pub allocation_id: AllocationId,
    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_source: Option<String>,

    pub fiscal_year: FiscalYear,
    pub status: RequestStatus,

    #[serde(default)]
    pub receipts: Vec<Receipt>,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Grand total of expenditure line items; kept in sync by
    /// [`Pre::recompute_total`]
    pub total_amount: Money,

    pub submitted_by: String,

    #[serde(default)]
    pub review_notes: String,

    #[serde(default)]
    pub rejection_reason: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partially_approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countersigned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub archive: ArchiveState,
}

impl Pre {
    /// Create an empty draft PRE
    pub fn new(
        allocation_id: AllocationId,
        department: impl Into<String>,
        fiscal_year: FiscalYear,
        submitted_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PreId::new(),
            allocation_id,
            department: department.into(),
            program: None,
            fund_source: None,
            fiscal_year,
            status: RequestStatus::Draft,
            receipts: Vec::new(),
            line_items: Vec::new(),
            total_amount: Money::zero(),
            submitted_by: submitted_by.into(),
            review_notes: String::new(),
            rejection_reason: String::new(),
            created_at: now,
            updated_at: now,
            submitted_at: None,
            partially_approved_at: None,
            countersigned_at: None,
            finalized_at: None,
            archive: ArchiveState::active(),
        }
    }

    /// Recompute the grand total from line items; returns the corrected total
    pub fn recompute_total(&mut self) -> Money {
        self.total_amount = self.line_items.iter().map(|li| li.total()).sum();
        self.total_amount
    }

    /// Total of the receipts side
    pub fn receipts_total(&self) -> Money {
        self.receipts.iter().map(|r| r.total()).sum()
    }

    /// Find a line item by id
    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.id == id)
    }

    /// Find a line item by id, mutably
    pub fn line_item_mut(&mut self, id: LineItemId) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|li| li.id == id)
    }

    /// Find a line item from a full UUID, the short display form, or the
    /// item name (case-insensitive)
    pub fn find_line_item(&self, reference: &str) -> Option<&LineItem> {
        if let Ok(id) = reference.parse::<LineItemId>() {
            if let Some(item) = self.line_item(id) {
                return Some(item);
            }
        }
        let reference_lower = reference.to_lowercase();
        self.line_items.iter().find(|li| {
            li.id.to_string() == reference || li.name.to_lowercase() == reference_lower
        })
    }

    /// Append a line item and refresh the total
    pub fn push_line_item(&mut self, item: LineItem) {
        self.line_items.push(item);
        self.recompute_total();
        self.updated_at = Utc::now();
    }

    /// Line items in a section, in insertion order
    pub fn section_items(&self, section: Section) -> Vec<&LineItem> {
        self.line_items
            .iter()
            .filter(|li| li.section == section)
            .collect()
    }

    // Workflow transitions. Validation against the allocation happens in the
    // service layer; these only enforce the status machine and stamp times.

    pub fn submit(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.advance(RequestStatus::Pending)?;
        self.submitted_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn partial_approve(&mut self, notes: impl Into<String>) -> Result<(), TransitionError> {
        self.status = self.status.advance(RequestStatus::PartiallyApproved)?;
        self.review_notes = notes.into();
        self.partially_approved_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn countersign(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.advance(RequestStatus::AwaitingVerification)?;
        self.countersigned_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), TransitionError> {
        self.status = self.status.advance(RequestStatus::Approved)?;
        self.finalized_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        self.status = self.status.advance(RequestStatus::Rejected)?;
        self.rejection_reason = reason.into();
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl fmt::Display for Pre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PRE {} - {} ({})",
            self.id, self.department, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quarter;

    fn quarters(q1: i64, q2: i64, q3: i64, q4: i64) -> QuarterAmounts {
        QuarterAmounts::new(
            Money::from_pesos(q1),
            Money::from_pesos(q2),
            Money::from_pesos(q3),
            Money::from_pesos(q4),
        )
    }

    fn draft_pre() -> Pre {
        let mut pre = Pre::new(
            AllocationId::new(),
            "College of Engineering",
            FiscalYear::parse("2025").unwrap(),
            "dean",
        );
        pre.push_line_item(LineItem::new(
            Section::Personnel,
            "Honoraria",
            quarters(100, 100, 100, 100),
        ));
        pre.push_line_item(LineItem::new(
            Section::Mooe,
            "Office Supplies Expenses",
            quarters(50, 0, 50, 0),
        ));
        pre
    }

    #[test]
    fn test_total_tracks_line_items() {
        let mut pre = draft_pre();
        assert_eq!(pre.total_amount, Money::from_pesos(500));

        pre.push_line_item(LineItem::new(
            Section::Capital,
            "Laboratory Equipment",
            quarters(0, 1000, 0, 0),
        ));
        assert_eq!(pre.total_amount, Money::from_pesos(1500));
    }

    #[test]
    fn test_receipts_excluded_from_total() {
        let mut pre = draft_pre();
        pre.receipts.push(Receipt {
            receipt_type: "Tuition".into(),
            quarters: quarters(1000, 1000, 1000, 1000),
        });
        pre.recompute_total();
        assert_eq!(pre.total_amount, Money::from_pesos(500));
        assert_eq!(pre.receipts_total(), Money::from_pesos(4000));
    }

    #[test]
    fn test_line_item_lookup() {
        let pre = draft_pre();
        let id = pre.line_items[0].id;
        assert_eq!(pre.line_item(id).unwrap().name, "Honoraria");
        assert!(pre.line_item(LineItemId::new()).is_none());
    }

    #[test]
    fn test_find_line_item_by_name_and_forms() {
        let pre = draft_pre();
        let item = &pre.line_items[0];

        // Case-insensitive name
        assert_eq!(pre.find_line_item("honoraria").unwrap().id, item.id);
        // Full UUID and short display forms
        assert_eq!(
            pre.find_line_item(&item.id.as_uuid().to_string()).unwrap().id,
            item.id
        );
        assert_eq!(
            pre.find_line_item(&item.id.to_string()).unwrap().id,
            item.id
        );

        assert!(pre.find_line_item("Unknown Item").is_none());
    }

    #[test]
    fn test_section_items() {
        let pre = draft_pre();
        assert_eq!(pre.section_items(Section::Personnel).len(), 1);
        assert_eq!(pre.section_items(Section::Capital).len(), 0);
    }

    #[test]
    fn test_workflow_path() {
        let mut pre = draft_pre();
        pre.submit().unwrap();
        assert_eq!(pre.status, RequestStatus::Pending);
        assert!(pre.submitted_at.is_some());

        pre.partial_approve("ok for signing").unwrap();
        assert_eq!(pre.review_notes, "ok for signing");

        pre.countersign().unwrap();
        pre.finalize().unwrap();
        assert_eq!(pre.status, RequestStatus::Approved);
        assert!(pre.finalized_at.is_some());

        // Finalizing twice is an error, so funds cannot be deducted twice
        assert!(pre.finalize().is_err());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut pre = draft_pre();
        pre.submit().unwrap();
        pre.reject("quarterly spread missing").unwrap();
        assert_eq!(pre.status, RequestStatus::Rejected);
        assert_eq!(pre.rejection_reason, "quarterly spread missing");
    }

    #[test]
    fn test_draft_cannot_finalize() {
        let mut pre = draft_pre();
        assert!(pre.finalize().is_err());
    }

    #[test]
    fn test_serialization() {
        let pre = draft_pre();
        let json = serde_json::to_string(&pre).unwrap();
        let back: Pre = serde_json::from_str(&json).unwrap();
        assert_eq!(back.line_items.len(), 2);
        assert_eq!(back.total_amount, pre.total_amount);
        assert_eq!(back.status, RequestStatus::Draft);
    }

    #[test]
    fn test_section_parse() {
        assert_eq!("MOOE".parse::<Section>().unwrap(), Section::Mooe);
        assert_eq!("ps".parse::<Section>().unwrap(), Section::Personnel);
        assert!("misc".parse::<Section>().is_err());
    }

    #[test]
    fn test_quarter_amounts_on_item() {
        let item = LineItem::new(Section::Mooe, "Training Expenses", quarters(10, 20, 30, 40));
        assert_eq!(item.quarters.get(Quarter::Q3), Money::from_pesos(30));
        assert_eq!(item.total(), Money::from_pesos(100));
    }
}
