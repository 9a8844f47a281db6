//! Activity design model
//!
//! A non-procurement fund utilization document (trainings, events, programs)
//! funded from approved PRE line items, moving through the same workflow as
//! purchase requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::ids::{ActivityDesignId, AllocationId};
use super::money::Money;
use super::purchase_request::Funding;
use super::status::{RequestStatus, TransitionError};

/// An activity design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDesign {
    pub id: ActivityDesignId,

    /// Document number; unique across active activity designs
    pub ad_number: String,

    pub allocation_id: AllocationId,
    pub department: String,
    pub activity_title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub purpose: String,

    /// Requested amount; must match the funding sum on submission
    pub total_amount: Money,

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

impl ActivityDesign {
    /// Create a new draft activity design
    pub fn new(
        ad_number: impl Into<String>,
        allocation_id: AllocationId,
        department: impl Into<String>,
        activity_title: impl Into<String>,
        total_amount: Money,
        submitted_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ActivityDesignId::new(),
            ad_number: ad_number.into(),
            allocation_id,
            department: department.into(),
            activity_title: activity_title.into(),
            description: String::new(),
            purpose: String::new(),
            total_amount,
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

    /// Sum of the funding rows
    pub fn funding_total(&self) -> Money {
        self.fundings.iter().map(|f| f.amount).sum()
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

impl fmt::Display for ActivityDesign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}) {}",
            self.ad_number, self.activity_title, self.status, self.total_amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItemId, PreId, Quarter};

    fn ad() -> ActivityDesign {
        ActivityDesign::new(
            "AD-2025-0001",
            AllocationId::new(),
            "Student Affairs",
            "Leadership Training",
            Money::from_pesos(25_000),
            "director",
        )
    }

    #[test]
    fn test_funding_total() {
        let mut doc = ad();
        doc.push_funding(Funding {
            pre_id: PreId::new(),
            line_item_id: LineItemId::new(),
            quarter: Quarter::Q2,
            amount: Money::from_pesos(25_000),
            notes: String::new(),
        });
        assert_eq!(doc.funding_total(), doc.total_amount);
    }

    #[test]
    fn test_workflow() {
        let mut doc = ad();
        doc.submit().unwrap();
        doc.partial_approve("cleared by the budget office").unwrap();
        doc.finalize().unwrap();
        assert_eq!(doc.status, RequestStatus::Approved);
        assert!(doc.finalize().is_err());
    }

    #[test]
    fn test_reject_requires_review_state() {
        let mut doc = ad();
        assert!(doc.reject("not yet submitted").is_err());
        doc.submit().unwrap();
        assert!(doc.reject("unclear purpose").is_ok());
    }

    #[test]
    fn test_serialization() {
        let doc = ad();
        let json = serde_json::to_string(&doc).unwrap();
        let back: ActivityDesign = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ad_number, "AD-2025-0001");
        assert_eq!(back.total_amount, Money::from_pesos(25_000));
    }
}
