//! Budget realignment model
//!
//! Moves amounts between PRE line items, per quarter. The transfer itself is
//! executed only on final approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::archive::ArchiveState;
use super::ids::{LineItemId, PreId, RealignmentId};
use super::money::Money;
use super::quarter::QuarterAmounts;
use super::status::{RequestStatus, TransitionError};

/// A request to move budget between PRE line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Realignment {
    pub id: RealignmentId,

    /// Where funds come from
    pub source_pre: PreId,
    pub source_line_item: LineItemId,

    /// Where funds go
    pub target_pre: PreId,
    pub target_line_item: LineItemId,

    /// Per-quarter amounts to move
    pub quarters: QuarterAmounts,

    #[serde(default)]
    pub reason: String,

    pub status: RequestStatus,
    pub requested_by: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

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

impl Realignment {
    /// Create a new realignment request
    ///
    /// Realignments skip the draft stage: they enter review immediately, as
    /// the request itself is the complete document.
    pub fn new(
        source_pre: PreId,
        source_line_item: LineItemId,
        target_pre: PreId,
        target_line_item: LineItemId,
        quarters: QuarterAmounts,
        reason: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RealignmentId::new(),
            source_pre,
            source_line_item,
            target_pre,
            target_line_item,
            quarters,
            reason: reason.into(),
            status: RequestStatus::Pending,
            requested_by: requested_by.into(),
            approved_by: None,
            review_notes: String::new(),
            rejection_reason: String::new(),
            created_at: now,
            updated_at: now,
            submitted_at: Some(now),
            partially_approved_at: None,
            countersigned_at: None,
            finalized_at: None,
            archive: ArchiveState::active(),
        }
    }

    /// Total amount across all quarters
    pub fn total_amount(&self) -> Money {
        self.quarters.total()
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

    pub fn finalize(&mut self, approved_by: impl Into<String>) -> Result<(), TransitionError> {
        self.status = self.status.advance(RequestStatus::Approved)?;
        self.approved_by = Some(approved_by.into());
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

impl fmt::Display for Realignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Realignment {} ({}) {}",
            self.id,
            self.status,
            self.total_amount()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quarter;

    fn realignment() -> Realignment {
        let mut quarters = QuarterAmounts::zero();
        quarters.set(Quarter::Q2, Money::from_pesos(5_000));
        quarters.set(Quarter::Q3, Money::from_pesos(2_500));
        Realignment::new(
            PreId::new(),
            LineItemId::new(),
            PreId::new(),
            LineItemId::new(),
            quarters,
            "unspent training budget",
            "dean",
        )
    }

    #[test]
    fn test_starts_pending() {
        let r = realignment();
        assert_eq!(r.status, RequestStatus::Pending);
        assert!(r.submitted_at.is_some());
    }

    #[test]
    fn test_total_amount() {
        assert_eq!(realignment().total_amount(), Money::from_pesos(7_500));
    }

    #[test]
    fn test_workflow() {
        let mut r = realignment();
        r.partial_approve("").unwrap();
        r.countersign().unwrap();
        r.finalize("budget officer").unwrap();
        assert_eq!(r.status, RequestStatus::Approved);
        assert_eq!(r.approved_by.as_deref(), Some("budget officer"));
        assert!(r.finalize("again").is_err());
    }

    #[test]
    fn test_reject() {
        let mut r = realignment();
        r.reject("source quarter exhausted").unwrap();
        assert_eq!(r.status, RequestStatus::Rejected);
    }

    #[test]
    fn test_serialization() {
        let r = realignment();
        let json = serde_json::to_string(&r).unwrap();
        let back: Realignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_amount(), Money::from_pesos(7_500));
    }
}
