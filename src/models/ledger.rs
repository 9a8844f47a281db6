//! Balance ledger entries
//!
//! Every change to an allocation's balance is recorded with before/after
//! snapshots, giving a complete financial audit trail independent of the
//! entity audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AllocationId, LedgerEntryId};
use super::money::Money;

/// What caused a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerKind {
    AllocationCreated,
    AllocationModified,
    PreApproved,
    PrApproved,
    AdApproved,
    RealignmentApproved,
    Reversion,
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LedgerKind::AllocationCreated => "Allocation Created",
            LedgerKind::AllocationModified => "Allocation Modified",
            LedgerKind::PreApproved => "PRE Approved",
            LedgerKind::PrApproved => "Purchase Request Approved",
            LedgerKind::AdApproved => "Activity Design Approved",
            LedgerKind::RealignmentApproved => "Budget Realignment Approved",
            LedgerKind::Reversion => "Budget Reversion",
        };
        write!(f, "{}", label)
    }
}

/// One balance change against an allocation
///
/// For planning-side events (PRE approval, realignment) the balance does not
/// move; `amount` then carries the document total while `previous_balance`
/// equals `new_balance`, keeping the per-allocation chain contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub allocation_id: AllocationId,
    pub kind: LedgerKind,

    /// Signed change (or document amount for planning-side events)
    pub amount: Money,

    /// Remaining balance before the change
    pub previous_balance: Money,

    /// Remaining balance after the change
    pub new_balance: Money,

    #[serde(default)]
    pub remarks: String,

    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        allocation_id: AllocationId,
        kind: LedgerKind,
        amount: Money,
        previous_balance: Money,
        new_balance: Money,
        actor: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            allocation_id,
            kind,
            amount,
            previous_balance,
            new_balance,
            remarks: remarks.into(),
            actor: actor.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_increase(&self) -> bool {
        self.new_balance > self.previous_balance
    }

    pub fn is_decrease(&self) -> bool {
        self.new_balance < self.previous_balance
    }

    /// Signed peso display of the amount
    pub fn formatted_amount(&self) -> String {
        if self.amount.is_positive() {
            format!("+{}", self.amount)
        } else {
            format!("{}", self.amount)
        }
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} ({} -> {})",
            self.created_at.format("%Y-%m-%d %H:%M"),
            self.kind,
            self.formatted_amount(),
            self.previous_balance,
            self.new_balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_decrease() {
        let up = LedgerEntry::new(
            AllocationId::new(),
            LedgerKind::AllocationCreated,
            Money::from_pesos(1000),
            Money::zero(),
            Money::from_pesos(1000),
            "bursar",
            "",
        );
        assert!(up.is_increase());
        assert!(!up.is_decrease());
        assert_eq!(up.formatted_amount(), "+₱1,000.00");

        let down = LedgerEntry::new(
            AllocationId::new(),
            LedgerKind::PrApproved,
            -Money::from_pesos(250),
            Money::from_pesos(1000),
            Money::from_pesos(750),
            "bursar",
            "PR-2025-0001",
        );
        assert!(down.is_decrease());
        assert_eq!(down.formatted_amount(), "-₱250.00");
    }

    #[test]
    fn test_planning_entry_keeps_balance() {
        let entry = LedgerEntry::new(
            AllocationId::new(),
            LedgerKind::PreApproved,
            Money::from_pesos(400_000),
            Money::from_pesos(500_000),
            Money::from_pesos(500_000),
            "system",
            "PRE grand total recorded",
        );
        assert!(!entry.is_increase());
        assert!(!entry.is_decrease());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            LedgerKind::RealignmentApproved.to_string(),
            "Budget Realignment Approved"
        );
        assert_eq!(
            serde_json::to_string(&LedgerKind::PrApproved).unwrap(),
            "\"PR_APPROVED\""
        );
    }

    #[test]
    fn test_serialization() {
        let entry = LedgerEntry::new(
            AllocationId::new(),
            LedgerKind::AdApproved,
            -Money::from_pesos(100),
            Money::from_pesos(500),
            Money::from_pesos(400),
            "officer",
            "AD-2025-0001",
        );
        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, LedgerKind::AdApproved);
        assert_eq!(back.new_balance, Money::from_pesos(400));
    }
}
