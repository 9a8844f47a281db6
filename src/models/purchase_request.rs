//! Purchase request model
//!
//! A procurement document funded from approved PRE line items. Item rows give
//! the costed detail; funding rows record which PRE line item and quarter
//! cover the cost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::ids::{AllocationId, LineItemId, PreId, PurchaseRequestId};
use super::money::Money;
use super::quarter::Quarter;
use super::status::{RequestStatus, TransitionError};

/// A costed item row on a purchase request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(default)]
    pub stock_no: String,
    pub unit: String,
    pub description: String,
    pub quantity: u32,
    pub unit_cost: Money,
}

impl PurchaseItem {
    pub fn total_cost(&self) -> Money {
        self.unit_cost * self.quantity as i64
    }
}

/// A funding row linking a document to a PRE line item quarter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Funding {
    pub pre_id: PreId,
    pub line_item_id: LineItemId,
    pub quarter: Quarter,
    pub amount: Money,

    #[serde(default)]
    pub notes: String,
}

/// A purchase request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: PurchaseRequestId,

    /// Document number; unique across active purchase requests
    pub pr_number: String,

    pub allocation_id: AllocationId,
    pub department: String,
    pub purpose: String,

    #[serde(default)]
    pub items: Vec<PurchaseItem>,

    #[serde(default)]
    pub fundings: Vec<Funding>,

    pub status: RequestStatus,
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

impl PurchaseRequest {
    /// Create a new draft purchase request
    pub fn new(
        pr_number: impl Into<String>,
        allocation_id: AllocationId,
        department: impl Into<String>,
        purpose: impl Into<String>,
        submitted_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PurchaseRequestId::new(),
            pr_number: pr_number.into(),
            allocation_id,
            department: department.into(),
            purpose: purpose.into(),
            items: Vec::new(),
            fundings: Vec::new(),
            status: RequestStatus::Draft,
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

    /// Sum of the costed item rows
    pub fn item_total(&self) -> Money {
        self.items.iter().map(|i| i.total_cost()).sum()
    }

    /// Sum of the funding rows
    pub fn funding_total(&self) -> Money {
        self.fundings.iter().map(|f| f.amount).sum()
    }

    /// The document total: item rows when present, otherwise the funding sum
    /// (for upload-style requests without itemization)
    pub fn total_amount(&self) -> Money {
        if self.items.is_empty() {
            self.funding_total()
        } else {
            self.item_total()
        }
    }

    /// Append an item row
    pub fn push_item(&mut self, item: PurchaseItem) {
        self.items.push(item);
        self.updated_at = Utc::now();
    }

    /// Append a funding row
    pub fn push_funding(&mut self, funding: Funding) {
        self.fundings.push(funding);
        self.updated_at = Utc::now();
    }

    // Workflow transitions; budget validation lives in the service layer.

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

impl fmt::Display for PurchaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}) {}",
            self.pr_number,
            self.department,
            self.status,
            self.total_amount()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr() -> PurchaseRequest {
        PurchaseRequest::new(
            "PR-2025-0001",
            AllocationId::new(),
            "College of Engineering",
            "Laboratory consumables",
            "dean",
        )
    }

    fn item(qty: u32, unit_cost_pesos: i64) -> PurchaseItem {
        PurchaseItem {
            stock_no: String::new(),
            unit: "box".into(),
            description: "Bond paper".into(),
            quantity: qty,
            unit_cost: Money::from_pesos(unit_cost_pesos),
        }
    }

    #[test]
    fn test_item_total() {
        let i = item(3, 250);
        assert_eq!(i.total_cost(), Money::from_pesos(750));
    }

    #[test]
    fn test_totals_prefer_items() {
        let mut doc = pr();
        doc.push_funding(Funding {
            pre_id: PreId::new(),
            line_item_id: LineItemId::new(),
            quarter: Quarter::Q1,
            amount: Money::from_pesos(750),
            notes: String::new(),
        });

        // Upload-style: no items, total comes from fundings
        assert_eq!(doc.total_amount(), Money::from_pesos(750));

        doc.push_item(item(3, 250));
        assert_eq!(doc.item_total(), Money::from_pesos(750));
        assert_eq!(doc.total_amount(), Money::from_pesos(750));
        assert_eq!(doc.funding_total(), Money::from_pesos(750));
    }

    #[test]
    fn test_workflow() {
        let mut doc = pr();
        doc.submit().unwrap();
        doc.partial_approve("").unwrap();
        doc.countersign().unwrap();
        doc.finalize().unwrap();
        assert_eq!(doc.status, RequestStatus::Approved);
        assert!(doc.finalize().is_err());
    }

    #[test]
    fn test_reject_from_pending() {
        let mut doc = pr();
        doc.submit().unwrap();
        doc.reject("no funding source").unwrap();
        assert_eq!(doc.status, RequestStatus::Rejected);
        assert_eq!(doc.rejection_reason, "no funding source");
    }

    #[test]
    fn test_serialization() {
        let mut doc = pr();
        doc.push_item(item(2, 100));
        let json = serde_json::to_string(&doc).unwrap();
        let back: PurchaseRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pr_number, "PR-2025-0001");
        assert_eq!(back.item_total(), Money::from_pesos(200));
    }
}
