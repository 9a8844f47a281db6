//! Shared approval workflow status
//!
//! PREs, purchase requests, activity designs, and realignments all move
//! through the same review pipeline. Only a final approval consumes budget;
//! documents in review reserve their funded amounts instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a reviewable document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Draft,
    Pending,
    #[serde(rename = "Partially Approved")]
    PartiallyApproved,
    #[serde(rename = "Awaiting Verification")]
    AwaitingVerification,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Whether the document is under review (reserves its funded amounts)
    pub fn is_in_review(&self) -> bool {
        matches!(
            self,
            RequestStatus::Pending
                | RequestStatus::PartiallyApproved
                | RequestStatus::AwaitingVerification
        )
    }

    /// Whether the document has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
    }

    /// Whether the document's funded amounts count as consumed
    pub fn consumes_budget(&self) -> bool {
        matches!(self, RequestStatus::Approved)
    }

    /// Whether the document's funded amounts count as reserved
    pub fn reserves_budget(&self) -> bool {
        self.is_in_review()
    }

    /// Whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (*self, next),
            (Draft, Pending)
                | (Pending, PartiallyApproved)
                | (Pending, Rejected)
                | (PartiallyApproved, AwaitingVerification)
                | (PartiallyApproved, Approved)
                | (PartiallyApproved, Rejected)
                | (AwaitingVerification, Approved)
                | (AwaitingVerification, Rejected)
        )
    }

    /// Move to `next`, or report an illegal transition
    pub fn advance(&self, next: RequestStatus) -> Result<RequestStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Draft => write!(f, "Draft"),
            RequestStatus::Pending => write!(f, "Pending"),
            RequestStatus::PartiallyApproved => write!(f, "Partially Approved"),
            RequestStatus::AwaitingVerification => write!(f, "Awaiting Verification"),
            RequestStatus::Approved => write!(f, "Approved"),
            RequestStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// An illegal workflow transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move from '{}' to '{}'", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}
